mod cli;

use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use log::{error, trace};

use dodns::Stage;

use cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            // Help that cannot be shown is a usage failure too
            if let Err(io) = e.print() {
                eprintln!("Could not print usage: {}", io);
                return ExitCode::from(Stage::Arguments.exit_code());
            }
            return ExitCode::from(cli::parse_exit_code(&e));
        }
    };

    Builder::new().filter_level(cli.loglevel.into()).init();

    let config = cli.into_config();
    trace!("Using configuration {:?}", config);

    match dodns::run(&config) {
        Ok(outcome) => {
            println!("{}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
