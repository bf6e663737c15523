//! stackboi - stacked branches and pull requests for git

mod cli;

use anstream::eprintln;
use clap::Parser;
use cli::Cli;
use cli::style::Stylize;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.setup_logging();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
