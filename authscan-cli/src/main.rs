//! ## authscan-cli
//! **Command-line front end**
//!
//! Scans an authentication log for brute-force login attempts and prints a
//! threshold-filtered attack report. The report goes to stdout; logs go to stderr.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("authscan: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
