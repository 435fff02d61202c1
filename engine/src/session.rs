//! Run orchestration.
//!
//! Acquires stations and devices (from the command line, the built-in sample,
//! interactive prompts or JSON requests), evaluates them and writes results.
//! Malformed interactive answers, including ones that are not UTF-8, are
//! re-asked; evaluation itself never fails.

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Mode, OutputFormat, RunConfig};
use crate::eval::{summarize, Coverage, Evaluator};
use crate::model::{Device, LinkStation};
use crate::protocol::report::write_report;
use crate::protocol::request::handle_bytes;
use crate::protocol::tuples::{parse_devices, parse_stations, TupleError};
use crate::scenario::{sample_devices, sample_stations};

pub const SAMPLE_PROMPT: &str = "Run sample? (y/n): ";
pub const STATIONS_PROMPT: &str = "Link Stations (x, y, reach): ";
pub const DEVICES_PROMPT: &str = "Devices (x, y): ";

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input closed while waiting for {0}")]
    InputClosed(&'static str),

    #[error("gave up on {question} after {attempts} invalid answers")]
    TooManyAttempts {
        question: &'static str,
        attempts: usize,
    },
}

/// Request counts from a serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServeStats {
    pub handled: usize,
    pub rejected: usize,
}

/// A configured run. Owns the evaluation pool for its whole lifetime.
pub struct Session {
    config: RunConfig,
    evaluator: Evaluator,
}

impl Session {
    pub fn new(config: RunConfig) -> Self {
        let evaluator = Evaluator::new(config.eval.clone());
        Session { config, evaluator }
    }

    /// Runs the configured mode. Prompts go to `prompt`, results to `out`.
    pub fn run<R, P, W>(
        &self,
        input: &mut R,
        prompt: &mut P,
        out: &mut W,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        P: Write,
        W: Write,
    {
        match &self.config.mode {
            Mode::Interactive => self.run_interactive(input, prompt, out).map(|_| ()),
            Mode::Sample => self.run_sample(out).map(|_| ()),
            Mode::Batch { stations, devices } => self.run_batch(stations, devices, out).map(|_| ()),
            Mode::Serve => self.serve(input, out).map(|_| ()),
        }
    }

    /// Evaluates the built-in sample.
    pub fn run_sample<W: Write>(&self, out: &mut W) -> Result<Vec<Coverage>, SessionError> {
        self.run_batch(&sample_stations(), &sample_devices(), out)
    }

    /// Evaluates an explicit deployment and writes the results.
    pub fn run_batch<W: Write>(
        &self,
        stations: &[LinkStation],
        devices: &[Device],
        out: &mut W,
    ) -> Result<Vec<Coverage>, SessionError> {
        let results = self.evaluator.evaluate(stations, devices);
        self.write_results(out, &results)?;

        let summary = summarize(&results);
        info!(
            devices = summary.devices,
            covered = summary.covered,
            uncovered = summary.uncovered,
            "evaluation complete"
        );
        Ok(results)
    }

    /// Asks whether to run the sample, and otherwise for stations and
    /// devices. Malformed answers are reported on `prompt` and re-asked.
    pub fn run_interactive<R, P, W>(
        &self,
        input: &mut R,
        prompt: &mut P,
        out: &mut W,
    ) -> Result<Vec<Coverage>, SessionError>
    where
        R: BufRead,
        P: Write,
        W: Write,
    {
        write!(prompt, "{}", SAMPLE_PROMPT)?;
        prompt.flush()?;
        let answer = read_answer(input)?.ok_or(SessionError::InputClosed("sample choice"))?;
        // Anything but yes, undecodable bytes included, means explicit input.
        let answer = String::from_utf8_lossy(&answer);
        if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            return self.run_sample(out);
        }

        let stations = self.ask(input, prompt, STATIONS_PROMPT, "link stations", parse_stations)?;
        let devices = self.ask(input, prompt, DEVICES_PROMPT, "devices", parse_devices)?;
        self.run_batch(&stations, &devices, out)
    }

    /// Answers one JSON request per non-blank input line with one JSON
    /// response line. Bad requests, undecodable lines included, are
    /// answered, not fatal.
    pub fn serve<R, W>(&self, input: &mut R, out: &mut W) -> Result<ServeStats, SessionError>
    where
        R: BufRead,
        W: Write,
    {
        let mut stats = ServeStats::default();

        while let Some(line) = read_answer(input)? {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let response = handle_bytes(&line, &self.evaluator);
            stats.handled += 1;
            if !response.is_ok() {
                stats.rejected += 1;
                warn!("bad request: {}", String::from_utf8_lossy(&line).trim());
            }

            serde_json::to_writer(&mut *out, &response)?;
            writeln!(out)?;
            out.flush()?;
        }

        info!(
            handled = stats.handled,
            rejected = stats.rejected,
            "serve loop finished"
        );
        Ok(stats)
    }

    /// Prompts until `parse` accepts an answer or the attempt limit is hit.
    fn ask<R, P, T>(
        &self,
        input: &mut R,
        prompt: &mut P,
        text: &str,
        question: &'static str,
        parse: fn(&str) -> Result<T, TupleError>,
    ) -> Result<T, SessionError>
    where
        R: BufRead,
        P: Write,
    {
        let mut attempts = 0;
        loop {
            write!(prompt, "{}", text)?;
            prompt.flush()?;

            let answer = read_answer(input)?.ok_or(SessionError::InputClosed(question))?;
            let parsed = match std::str::from_utf8(&answer) {
                Ok(decoded) => parse(decoded.trim()).map_err(|e| e.to_string()),
                Err(_) => Err("input is not valid UTF-8".to_string()),
            };
            match parsed {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempts += 1;
                    debug!(question, attempts, "rejected input: {}", e);
                    writeln!(prompt, "Invalid {}: {}. Please try again.", question, e)?;
                    if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                        return Err(SessionError::TooManyAttempts { question, attempts });
                    }
                }
            }
        }
    }

    fn write_results<W: Write>(
        &self,
        out: &mut W,
        results: &[Coverage],
    ) -> Result<(), SessionError> {
        match self.config.output {
            OutputFormat::Text => write_report(out, results)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, results)?;
                writeln!(out)?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

/// Reads one line as raw bytes, without decoding it. Returns `None` at end
/// of input.
fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<Vec<u8>>, SessionError> {
    let mut line = Vec::new();
    if input.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
