use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

pub const CONTENT_PATTERN_SHORT: &str = "-p";
pub const CONTENT_PATTERN_LONG: &str = "--content-pattern";

/// Flags that take exactly one following value.
pub const VALUE_FLAGS: &[&str] = &[
    "-d",
    "--directory",
    "-f",
    "--filename-pattern",
    "-s",
    "--max-size",
    "-c",
    "--max-count",
];

#[derive(Parser, Debug)]
#[command(
    name = "grepdir",
    author,
    version,
    about = "Find files under a directory that contain literal byte patterns",
    args_override_self = true,
    after_help = "The content pattern flag consumes every argument after it, so it must be given last:\n  grepdir -d ./src -f .rs:.toml -s 100000 -p \"fn main\" \"unsafe\""
)]
pub struct Cli {
    /// Directory to scan recursively [default: current directory]
    #[arg(short = 'd', long, value_name = "DIR", allow_hyphen_values = true)]
    pub directory: Option<PathBuf>,

    /// Only scan files whose full path contains one of these ':'-separated substrings (e.g. ".txt:.cxx")
    #[arg(short = 'f', long, value_name = "PATTERNS", allow_hyphen_values = true)]
    pub filename_pattern: Option<String>,

    /// Skip files larger than this many bytes (0 = unlimited)
    #[arg(short = 's', long, value_name = "BYTES", allow_hyphen_values = true)]
    pub max_size: Option<String>,

    /// Stop the whole scan after this many files were searched (0 = unlimited)
    #[arg(short = 'c', long, value_name = "COUNT", allow_hyphen_values = true)]
    pub max_count: Option<String>,

    /// List skipped files and the reason they were skipped
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the parsed arguments before scanning and enable debug logging
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// (Required) Literal patterns to search for. Every argument after this flag is a pattern, so it must come last
    #[arg(
        short = 'p',
        long,
        value_name = "PATTERN",
        num_args = 1..,
        allow_hyphen_values = true
    )]
    pub content_pattern: Vec<OsString>,
}
