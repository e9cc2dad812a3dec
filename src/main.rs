mod cli;
mod commands;

use clap::Parser;
use cli::cmd_enums::Cli;
use lilyponddist::{log_error, logger};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.global.debug);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
