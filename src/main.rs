use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trscan::cli::{Arguments, ExitStatus};

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TRSCAN_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "trscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    match trscan::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
