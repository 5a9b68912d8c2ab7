use crate::app::models::{FileEntry, Settings};
use std::path::Path;

/// Verdict of the filter chain for one walked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Not a candidate at all; not recorded anywhere.
    Skip,
    /// Larger than the configured maximum size.
    Oversize(u64),
    /// The max file count is exhausted; the walk must stop.
    Halt,
    /// Open and scan the file.
    Examine,
}

/// Applies the cheap checks in order: file type, filename patterns, size, count.
///
/// `examined` is the number of files already examined before this entry.
pub fn should_examine(entry: &FileEntry, settings: &Settings, examined: u64) -> FilterDecision {
    if !entry.is_file {
        return FilterDecision::Skip;
    }

    if !matches_filename(&entry.path, &settings.filename_patterns) {
        return FilterDecision::Skip;
    }

    if settings.max_file_size != 0 && entry.size > settings.max_file_size {
        return FilterDecision::Oversize(entry.size);
    }

    if settings.max_file_count != 0 && examined >= settings.max_file_count {
        return FilterDecision::Halt;
    }

    FilterDecision::Examine
}

/// Substring test against the full path. No patterns means everything passes.
///
/// Needs nothing but the path, so the walker can drop entries before any `stat`.
pub fn matches_filename(path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let path = path.to_string_lossy();
    patterns.iter().any(|pattern| path.contains(pattern.as_str()))
}
