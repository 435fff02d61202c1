//! linkstation -- finds the best link station for each device.
//!
//! Reads stations and devices from the command line, interactive prompts or
//! JSON requests on stdin, and writes one result per device to stdout.
//! Prompts and logs go to stderr.

use std::env;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use linkstation::config::{parse_args, Invocation, USAGE};
use linkstation::session::Session;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let config = match parse_args(env::args().skip(1)) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            init_tracing(false);
            error!("{}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    init_tracing(config.verbose);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut input = stdin.lock();
    let mut out = BufWriter::new(stdout.lock());
    let mut prompt = stderr.lock();

    let session = Session::new(config);
    match session.run(&mut input, &mut prompt, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
