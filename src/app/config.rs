use crate::app::cli::{Cli, CONTENT_PATTERN_LONG, CONTENT_PATTERN_SHORT, VALUE_FLAGS};
use crate::app::models::Settings;
use clap::Parser;
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid target directory: {}", .0.display())]
    InvalidDirectory(PathBuf),
    #[error("Invalid value for {flag}: '{value}' is not a non-negative integer")]
    InvalidNumber { flag: &'static str, value: String },
    #[error("No content patterns have been specified")]
    MissingContentPatterns,
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("Failed to get current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Turns the raw argument list (program name first) into validated settings.
///
/// Everything after the content pattern flag is taken as a pattern verbatim,
/// which is why that flag has to be the last one.
pub fn parse<I, T>(tokens: I) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
    let (head, trailing_patterns) = split_content_patterns(tokens);

    let cli = Cli::try_parse_from(head)?;

    let max_file_size = parse_limit("--max-size", cli.max_size.as_deref())?;
    let max_file_count = parse_limit("--max-count", cli.max_count.as_deref())?;

    let target_directory = match cli.directory {
        Some(dir) => dir,
        None => env::current_dir().map_err(ConfigError::CurrentDir)?,
    };
    if !target_directory.is_dir() {
        return Err(ConfigError::InvalidDirectory(target_directory));
    }

    let filename_patterns = cli
        .filename_pattern
        .as_deref()
        .map(split_filename_patterns)
        .unwrap_or_default();

    let mut content_patterns = cli.content_pattern;
    content_patterns.extend(trailing_patterns.unwrap_or_default());
    if content_patterns.is_empty() {
        return Err(ConfigError::MissingContentPatterns);
    }

    Ok(Settings {
        target_directory,
        content_patterns,
        filename_patterns,
        max_file_size,
        max_file_count,
        verbose: cli.verbose,
        debug: cli.debug,
    })
}

/// Cuts the token list at the first content pattern flag that is not itself
/// the value of another flag. Returns the tokens for clap and, if the flag
/// was found, the raw patterns that follow it. An inline
/// `--content-pattern=VALUE` stays in the clap half so its value is kept as is.
fn split_content_patterns(mut tokens: Vec<OsString>) -> (Vec<OsString>, Option<Vec<OsString>>) {
    let inline_prefix = format!("{}=", CONTENT_PATTERN_LONG);
    let mut index = 1;

    while index < tokens.len() {
        let token = tokens[index].to_string_lossy().into_owned();

        let cut = if token == CONTENT_PATTERN_SHORT || token == CONTENT_PATTERN_LONG {
            index
        } else if token.starts_with(&inline_prefix) {
            index + 1
        } else {
            if VALUE_FLAGS.contains(&token.as_str()) {
                index += 1;
            }
            index += 1;
            continue;
        };

        let patterns = tokens.split_off(index + 1);
        tokens.truncate(cut);
        return (tokens, Some(patterns));
    }

    (tokens, None)
}

fn split_filename_patterns(raw: &str) -> Vec<String> {
    raw.split(':')
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_limit(flag: &'static str, raw: Option<&str>) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(0),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            flag,
            value: value.to_string(),
        }),
    }
}
