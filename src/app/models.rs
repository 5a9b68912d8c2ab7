use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

/// Validated run configuration. Built once by `config::parse`, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub target_directory: PathBuf,
    /// Raw argument bytes, never re-encoded.
    pub content_patterns: Vec<OsString>,
    pub filename_patterns: Vec<String>,
    /// Bytes; 0 means unlimited.
    pub max_file_size: u64,
    /// Files examined before the walk stops; 0 means unlimited.
    pub max_file_count: u64,
    pub verbose: bool,
    pub debug: bool,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target Directory: {}", self.target_directory.display())?;
        writeln!(f, "Maximum File Size: {}", self.max_file_size)?;
        writeln!(f, "Maximum File Count: {}", self.max_file_count)?;
        writeln!(f)?;
        write_pattern_block(f, "Content Patterns", &self.content_patterns)?;
        writeln!(f)?;
        write_pattern_block(f, "Filename Patterns", &self.filename_patterns)
    }
}

fn write_pattern_block<P: AsRef<OsStr>>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    patterns: &[P],
) -> fmt::Result {
    writeln!(f, "{}: {{", label)?;
    for pattern in patterns {
        writeln!(f, "    {}", pattern.as_ref().to_string_lossy())?;
    }
    writeln!(f, "}}")
}

/// A walked filesystem entry, as seen by the filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Regular file after following symlinks.
    pub is_file: bool,
    pub size: u64,
}

/// What happened to a single file that reached the content stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Patterns found, in content-pattern order. Never empty.
    Matched(Vec<OsString>),
    SkippedOversize(u64),
    SkippedUnreadable,
    SkippedException(String),
    NotMatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    pub path: PathBuf,
    pub patterns: Vec<OsString>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizeEntry {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionEntry {
    pub path: PathBuf,
    pub message: String,
}

/// Results accumulated by the traversal, in discovery order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub matches: Vec<MatchEntry>,
    pub oversize: Vec<OversizeEntry>,
    pub unreadable: Vec<PathBuf>,
    pub exceptions: Vec<ExceptionEntry>,
    pub files_examined: u64,
    /// Set when the max file count stopped the walk early.
    pub halted: bool,
}

impl ScanReport {
    /// Files an outcome into its bucket. `NotMatched` only counts.
    pub fn record(&mut self, path: PathBuf, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Matched(patterns) => {
                self.files_examined += 1;
                self.matches.push(MatchEntry { path, patterns });
            }
            ScanOutcome::NotMatched => self.files_examined += 1,
            ScanOutcome::SkippedOversize(size) => self.oversize.push(OversizeEntry { path, size }),
            ScanOutcome::SkippedUnreadable => self.unreadable.push(path),
            ScanOutcome::SkippedException(message) => {
                self.exceptions.push(ExceptionEntry { path, message })
            }
        }
    }
}
