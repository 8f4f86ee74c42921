use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use ligafont_cli::cli::Cli;
use log::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    Builder::from_env(Env::default().default_filter_or(cli.log_level())).init();

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
