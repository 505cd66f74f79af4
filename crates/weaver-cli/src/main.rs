//! `note-weaver` binary.
//!
//! Exit codes: 0 when every scenario passes, 1 when a scenario fails or a
//! check finds issues, 2 for invalid configuration or unreadable features.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use weaver_cli::cli::{Cli, Outcome, dispatch};
use weaver_cli::logging::init_logging;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config() {
        Ok(config) => config,
        Err(err) => {
            init_logging(cli.log_level.unwrap_or_default());
            error!(error = %err, "invalid configuration");
            report(&err);
            return ExitCode::from(EXIT_USAGE);
        }
    };
    init_logging(config.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "starting note-weaver");

    match dispatch(cli, &config) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failure) => ExitCode::from(EXIT_FAILURE),
        Err(err) => {
            report(&err);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn report(err: &eyre::Report) {
    let _ = writeln!(io::stderr(), "error: {err:#}");
}
