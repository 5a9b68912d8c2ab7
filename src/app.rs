// Declare modules
pub mod cli;
pub mod config;
pub mod filter;
pub mod formatter;
pub mod matcher;
pub mod models;
pub mod progress;
pub mod scanner;

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::{self, Write};

use self::config::{parse, ConfigError};
use self::formatter::ReportFormatter;
use self::scanner::Scanner;

/// Parses the arguments, scans the tree and prints the report to stdout.
pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    // 1. Parse Args
    let settings = match parse(args) {
        Ok(settings) => settings,
        Err(ConfigError::Usage(err)) if !err.use_stderr() => {
            // --help / --version
            err.print().context("Failed to print help")?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    init_logging(settings.debug);

    if settings.debug {
        eprintln!("\n{}", settings);
    }

    // 2. Scan Directory
    log::debug!("Scanning {}", settings.target_directory.display());
    let scanner = Scanner::new(&settings)?;
    let report = scanner.run();

    // 3. Print Report
    let output = ReportFormatter::render(&report, &settings);
    let mut stdout = io::stdout().lock();
    writeln!(stdout).context("Failed to write report")?;
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write report")?;

    Ok(())
}

fn init_logging(debug: bool) {
    let mut builder = if debug {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        builder
            .filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
            .format_timestamp_millis();
        builder
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    };
    builder.init();
}
