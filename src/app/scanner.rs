use crate::app::filter::{matches_filename, should_examine, FilterDecision};
use crate::app::matcher::ContentMatcher;
use crate::app::models::{FileEntry, ScanOutcome, ScanReport, Settings};
use crate::app::progress::ScanProgress;
use anyhow::Result;
use ignore::{Walk, WalkBuilder};
use std::fs::{self, File};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

pub struct Scanner<'a> {
    settings: &'a Settings,
    matcher: ContentMatcher,
}

impl<'a> Scanner<'a> {
    pub fn new(settings: &'a Settings) -> Result<Self> {
        Ok(Self {
            settings,
            matcher: ContentMatcher::new(&settings.content_patterns)?,
        })
    }

    /// Walks the target directory and files every candidate into the report.
    ///
    /// Per-file failures are recorded, never returned; only the max file
    /// count ends the walk early.
    pub fn run(&self) -> ScanReport {
        // The pre-count is a second walk, only worth it when a bar can be drawn.
        let is_tty = io::stderr().is_terminal();
        let progress = if is_tty {
            ScanProgress::new(self.count_entries(), is_tty)
        } else {
            ScanProgress::hidden()
        };

        let mut report = ScanReport::default();

        for result in self.walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_walk_error(&mut report, err);
                    continue;
                }
            };

            // The root itself is not a candidate.
            if entry.depth() == 0 {
                continue;
            }
            progress.inc();

            if !matches_filename(entry.path(), &self.settings.filename_patterns) {
                continue;
            }

            let file = match describe(entry.path()) {
                Ok(file) => file,
                Err(err) => {
                    log::debug!("Cannot stat {}: {}", entry.path().display(), err);
                    report.record(entry.into_path(), ScanOutcome::SkippedException(err.to_string()));
                    continue;
                }
            };

            match should_examine(&file, self.settings, report.files_examined) {
                FilterDecision::Skip => {}
                FilterDecision::Oversize(size) => {
                    log::debug!("Skipping {} ({} bytes)", file.path.display(), size);
                    report.record(file.path, ScanOutcome::SkippedOversize(size));
                }
                FilterDecision::Halt => {
                    log::info!(
                        "Reached the maximum file count of {}, stopping",
                        self.settings.max_file_count
                    );
                    report.halted = true;
                    break;
                }
                FilterDecision::Examine => {
                    let outcome = self.examine(&file);
                    report.record(file.path, outcome);
                }
            }
        }

        progress.finish();
        report
    }

    /// Reads one file fully and searches it. The buffer is dropped on return.
    fn examine(&self, file: &FileEntry) -> ScanOutcome {
        let mut handle = match File::open(&file.path) {
            Ok(handle) => handle,
            Err(err) => {
                log::debug!("Cannot open {}: {}", file.path.display(), err);
                return ScanOutcome::SkippedUnreadable;
            }
        };

        let mut content: Vec<u8> = Vec::new();
        let reserved = usize::try_from(file.size)
            .map_err(|err| err.to_string())
            .and_then(|size| content.try_reserve_exact(size).map_err(|err| err.to_string()));
        if let Err(err) = reserved {
            log::debug!("Cannot buffer {} ({} bytes): {}", file.path.display(), file.size, err);
            return ScanOutcome::SkippedException(format!("Cannot buffer {} bytes: {}", file.size, err));
        }

        if let Err(err) = handle.read_to_end(&mut content) {
            log::debug!("Failed reading {}: {}", file.path.display(), err);
            return ScanOutcome::SkippedException(err.to_string());
        }

        let found = self.matcher.scan(&content);
        if found.is_empty() {
            ScanOutcome::NotMatched
        } else {
            ScanOutcome::Matched(found)
        }
    }

    /// Walk errors are kept in the report like per-file exceptions. Errors
    /// without a path are filed under the target directory.
    fn record_walk_error(&self, report: &mut ScanReport, err: ignore::Error) {
        log::warn!("Error walking entry: {}", err);
        let path = match error_path(&err) {
            Some(path) if !matches_filename(path, &self.settings.filename_patterns) => return,
            Some(path) => path.to_path_buf(),
            None => self.settings.target_directory.clone(),
        };
        report.record(path, ScanOutcome::SkippedException(err.to_string()));
    }

    /// Counts every entry below the root for the progress bar.
    fn count_entries(&self) -> u64 {
        self.walker()
            .filter_map(|result| result.ok())
            .filter(|entry| entry.depth() > 0)
            .count() as u64
    }

    /// Plain recursive walk: hidden files and ignore files are not special.
    fn walker(&self) -> Walk {
        WalkBuilder::new(&self.settings.target_directory)
            .standard_filters(false)
            .follow_links(false)
            .build()
    }
}

/// Resolves symlinks so a link to a regular file is scanned like the file.
fn describe(path: &Path) -> io::Result<FileEntry> {
    let metadata = fs::metadata(path)?;
    Ok(FileEntry {
        path: path.to_path_buf(),
        is_file: metadata.is_file(),
        size: metadata.len(),
    })
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn settings(dir: &TempDir, patterns: &[&str]) -> Settings {
        Settings {
            target_directory: dir.path().to_path_buf(),
            content_patterns: patterns.iter().map(OsString::from).collect(),
            filename_patterns: Vec::new(),
            max_file_size: 0,
            max_file_count: 0,
            verbose: false,
            debug: false,
        }
    }

    fn run(settings: &Settings) -> ScanReport {
        Scanner::new(settings).unwrap().run()
    }

    fn matched_names(report: &ScanReport) -> BTreeSet<String> {
        report
            .matches
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_oversize_file_is_skipped_not_examined() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("note.txt"), "hello world").unwrap();
        let big = dir.path().join("big.bin");
        fs::write(&big, "hello").unwrap();
        File::options().write(true).open(&big).unwrap().set_len(1000).unwrap();

        let mut s = settings(&dir, &["hello"]);
        s.max_file_size = 500;
        let report = run(&s);

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].path, dir.path().join("note.txt"));
        assert_eq!(report.matches[0].patterns, vec!["hello"]);
        assert_eq!(report.oversize.len(), 1);
        assert_eq!(report.oversize[0].path, big);
        assert_eq!(report.oversize[0].size, 1000);
        assert_eq!(report.files_examined, 1);
    }

    #[test]
    fn test_all_matching_patterns_are_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("both.txt"), "bar then foo").unwrap();

        let report = run(&settings(&dir, &["foo", "bar"]));

        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].patterns, vec!["foo", "bar"]);
    }

    #[test]
    fn test_unmatched_files_are_counted_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "nothing here").unwrap();
        fs::write(dir.path().join("b.txt"), "needle").unwrap();

        let report = run(&settings(&dir, &["needle"]));

        assert_eq!(report.files_examined, 2);
        assert_eq!(matched_names(&report), BTreeSet::from(["b.txt".to_string()]));
        assert!(!report.halted);
    }

    #[test]
    fn test_recurses_into_subdirectories_and_hidden_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/.hidden")).unwrap();
        fs::write(dir.path().join("a/b/.hidden/deep.txt"), "needle").unwrap();
        fs::write(dir.path().join(".gitignore"), "a/\n").unwrap();

        let report = run(&settings(&dir, &["needle"]));

        assert_eq!(matched_names(&report), BTreeSet::from(["deep.txt".to_string()]));
        assert_eq!(report.files_examined, 2);
    }

    #[test]
    fn test_max_file_count_halts_walk() {
        let dir = TempDir::new().unwrap();
        for name in ["one.txt", "two.txt", "three.txt"] {
            fs::write(dir.path().join(name), "needle").unwrap();
        }

        let mut s = settings(&dir, &["needle"]);
        s.max_file_count = 2;
        let report = run(&s);

        assert_eq!(report.files_examined, 2);
        assert_eq!(report.matches.len(), 2);
        assert!(report.halted);
    }

    #[test]
    fn test_count_cap_equal_to_file_count_does_not_halt() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one.txt"), "x").unwrap();
        fs::write(dir.path().join("two.txt"), "x").unwrap();

        let mut s = settings(&dir, &["x"]);
        s.max_file_count = 2;
        let report = run(&s);

        assert_eq!(report.files_examined, 2);
        assert!(!report.halted);
    }

    #[test]
    fn test_filename_patterns_exclude_before_reading() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep.rs"), "needle").unwrap();
        fs::write(dir.path().join("drop.md"), "needle").unwrap();
        fs::write(dir.path().join("huge.log"), "needle needle").unwrap();

        let mut s = settings(&dir, &["needle"]);
        s.filename_patterns = vec![".rs".to_string(), ".toml".to_string()];
        s.max_file_size = 8;
        let report = run(&s);

        assert_eq!(matched_names(&report), BTreeSet::from(["keep.rs".to_string()]));
        assert_eq!(report.files_examined, 1);
        assert!(report.oversize.is_empty());
    }

    #[test]
    fn test_runs_are_stable() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.txt"), "alpha beta").unwrap();
        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        fs::write(dir.path().join("c.txt"), "gamma").unwrap();

        let s = settings(&dir, &["alpha", "beta"]);
        let first = run(&s);
        let second = run(&s);

        assert_eq!(matched_names(&first), matched_names(&second));
        assert_eq!(first.files_examined, second.files_examined);
        assert_eq!(first.files_examined, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_recorded_as_exception() {
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();
        fs::write(dir.path().join("ok.txt"), "needle").unwrap();

        let report = run(&settings(&dir, &["needle"]));

        assert_eq!(report.exceptions.len(), 1);
        assert_eq!(report.exceptions[0].path, dir.path().join("dangling"));
        assert_eq!(report.matches.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_scanned() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), "needle").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        let report = run(&settings(&dir, &["needle"]));

        assert_eq!(
            matched_names(&report),
            BTreeSet::from(["real.txt".to_string(), "link.txt".to_string()])
        );
    }

    #[test]
    fn test_error_path_unwraps_depth() {
        let err = ignore::Error::WithDepth {
            depth: 2,
            err: Box::new(ignore::Error::WithPath {
                path: PathBuf::from("/x/y"),
                err: Box::new(ignore::Error::Io(io::Error::other("denied"))),
            }),
        };
        assert_eq!(error_path(&err), Some(Path::new("/x/y")));
    }

    #[cfg(unix)]
    #[test]
    fn test_filename_filter_runs_before_stat() {
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("notes.md")).unwrap();
        fs::write(dir.path().join("ok.rs"), "needle").unwrap();

        let mut s = settings(&dir, &["needle"]);
        s.filename_patterns = vec![".rs".to_string()];
        let report = run(&s);

        assert!(report.exceptions.is_empty());
        assert_eq!(matched_names(&report), BTreeSet::from(["ok.rs".to_string()]));
    }

    #[cfg(unix)]
    #[test]
    fn test_unbufferable_file_is_recorded_and_scan_continues() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.txt"), "needle").unwrap();
        let sparse = dir.path().join("sparse.bin");
        File::create(&sparse).unwrap().set_len(1 << 43).unwrap();

        let report = run(&settings(&dir, &["needle"]));

        assert_eq!(report.exceptions.len(), 1);
        assert_eq!(report.exceptions[0].path, sparse);
        assert!(report.exceptions[0].message.contains("8796093022208"));
        assert_eq!(matched_names(&report), BTreeSet::from(["ok.txt".to_string()]));
        assert_eq!(report.files_examined, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unopenable_file_is_unreadable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.txt"), "needle").unwrap();
        let locked = dir.path().join("locked.txt");
        fs::write(&locked, "needle").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&locked).is_ok() {
            // Permission bits are not enforced for this user (e.g. root).
            return;
        }

        let report = run(&settings(&dir, &["needle"]));

        assert_eq!(report.unreadable, vec![locked.clone()]);
        assert_eq!(report.files_examined, 1);
        assert_eq!(matched_names(&report), BTreeSet::from(["ok.txt".to_string()]));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_walk_error_without_path_is_filed_under_root() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, &["needle"]);
        let scanner = Scanner::new(&s).unwrap();
        let mut report = ScanReport::default();

        scanner.record_walk_error(&mut report, ignore::Error::Io(io::Error::other("gone")));

        assert_eq!(report.exceptions.len(), 1);
        assert_eq!(report.exceptions[0].path, dir.path());
    }

    #[test]
    fn test_walk_error_outside_filename_patterns_is_dropped() {
        let dir = TempDir::new().unwrap();
        let mut s = settings(&dir, &["needle"]);
        s.filename_patterns = vec![".rs".to_string()];
        let scanner = Scanner::new(&s).unwrap();
        let mut report = ScanReport::default();

        let err = ignore::Error::WithPath {
            path: dir.path().join("private"),
            err: Box::new(ignore::Error::Io(io::Error::other("denied"))),
        };
        scanner.record_walk_error(&mut report, err);

        assert!(report.exceptions.is_empty());
    }
}
