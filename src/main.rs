mod app;

use clap::CommandFactory;
use std::env;
use std::process::ExitCode;

use app::cli::Cli;
use app::config::ConfigError;

fn main() -> ExitCode {
    match app::run(env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ConfigError>() {
                Some(ConfigError::Usage(clap_err)) => {
                    let _ = clap_err.print();
                }
                Some(ConfigError::MissingContentPatterns) => {
                    eprintln!("Error: {}\n", err);
                    let _ = Cli::command().print_long_help();
                }
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
