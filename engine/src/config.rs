//! Run configuration and command-line parsing.
//!
//! Flags are parsed by hand into a [`RunConfig`]; see [`USAGE`] for the list.
//! Without a mode flag the binary asks for its input interactively.

use thiserror::Error;

use crate::eval::EvalOptions;
use crate::model::{Device, LinkStation};
use crate::protocol::tuples::{parse_devices, parse_stations, TupleError};

pub const USAGE: &str = "\
Usage: linkstation [OPTIONS]

Finds the link station delivering the most power to each device.

Options:
  --sample                   Evaluate the built-in sample and exit
  --serve                    Answer JSON requests, one per stdin line
  --stations LIST            Station tuples, e.g. \"[(0, 0, 10)]\"
  --devices LIST             Device tuples, e.g. \"[(0, 0), (5, 5)]\"
  --json                     Write results as JSON instead of text
  --threads N                Worker threads for large batches (default: 1)
  --parallel-threshold N     Devices needed before going parallel (default: 1024)
  --max-attempts N           Prompt retries per question, 0 = unlimited (default: 0)
  --verbose, -v              Debug logging on stderr
  --help, -h                 Print this help

Without --sample, --serve or --stations/--devices the stations and devices
are read interactively.";

/// Errors in command-line configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownFlag(String),

    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("invalid {flag}: {source}")]
    InvalidInput {
        flag: &'static str,
        #[source]
        source: TupleError,
    },

    #[error("{given} requires {missing}")]
    IncompleteBatch {
        given: &'static str,
        missing: &'static str,
    },

    #[error("only one of --sample, --serve or --stations/--devices may be given")]
    ConflictingModes,
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Prompt for the sample choice, stations and devices.
    Interactive,
    /// Evaluate the built-in sample.
    Sample,
    /// Evaluate stations and devices given on the command line.
    Batch {
        stations: Vec<LinkStation>,
        devices: Vec<Device>,
    },
    /// Answer JSON requests line by line.
    Serve,
}

/// How results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: Mode,
    pub output: OutputFormat,
    pub eval: EvalOptions,
    /// Maximum answers per prompt before giving up. `None` keeps asking.
    pub max_attempts: Option<usize>,
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            mode: Mode::Interactive,
            output: OutputFormat::Text,
            eval: EvalOptions::default(),
            max_attempts: None,
            verbose: false,
        }
    }
}

/// Result of parsing the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(RunConfig),
    Help,
}

/// Parses command-line arguments (excluding the program name).
pub fn parse_args<I>(args: I) -> Result<Invocation, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = RunConfig::default();
    let mut sample = false;
    let mut serve = false;
    let mut stations: Option<Vec<LinkStation>> = None;
    let mut devices: Option<Vec<Device>> = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => sample = true,
            "--serve" => serve = true,
            "--json" => config.output = OutputFormat::Json,
            "--verbose" | "-v" => config.verbose = true,
            "--help" | "-h" => return Ok(Invocation::Help),
            "--stations" => {
                let value = next_value(&mut args, "--stations")?;
                let parsed = parse_stations(&value).map_err(|source| ConfigError::InvalidInput {
                    flag: "--stations",
                    source,
                })?;
                stations = Some(parsed);
            }
            "--devices" => {
                let value = next_value(&mut args, "--devices")?;
                let parsed = parse_devices(&value).map_err(|source| ConfigError::InvalidInput {
                    flag: "--devices",
                    source,
                })?;
                devices = Some(parsed);
            }
            "--threads" => {
                let threads = parse_count(&mut args, "--threads")?;
                if threads == 0 {
                    return Err(ConfigError::InvalidValue {
                        flag: "--threads",
                        value: threads.to_string(),
                    });
                }
                config.eval.threads = threads;
            }
            "--parallel-threshold" => {
                config.eval.parallel_threshold = parse_count(&mut args, "--parallel-threshold")?;
            }
            "--max-attempts" => {
                let attempts = parse_count(&mut args, "--max-attempts")?;
                config.max_attempts = (attempts > 0).then_some(attempts);
            }
            other => return Err(ConfigError::UnknownFlag(other.to_string())),
        }
    }

    let batch = match (stations, devices) {
        (Some(stations), Some(devices)) => Some(Mode::Batch { stations, devices }),
        (Some(_), None) => {
            return Err(ConfigError::IncompleteBatch {
                given: "--stations",
                missing: "--devices",
            })
        }
        (None, Some(_)) => {
            return Err(ConfigError::IncompleteBatch {
                given: "--devices",
                missing: "--stations",
            })
        }
        (None, None) => None,
    };

    let modes = [sample, serve, batch.is_some()];
    if modes.iter().filter(|&&m| m).count() > 1 {
        return Err(ConfigError::ConflictingModes);
    }

    config.mode = match batch {
        Some(batch) => batch,
        None if sample => Mode::Sample,
        None if serve => Mode::Serve,
        None => Mode::Interactive,
    };

    Ok(Invocation::Run(config))
}

fn next_value<I>(args: &mut I, flag: &'static str) -> Result<String, ConfigError>
where
    I: Iterator<Item = String>,
{
    args.next().ok_or(ConfigError::MissingValue(flag))
}

fn parse_count<I>(args: &mut I, flag: &'static str) -> Result<usize, ConfigError>
where
    I: Iterator<Item = String>,
{
    let value = next_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { flag, value })
}
