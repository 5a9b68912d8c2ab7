use indicatif::{ProgressBar, ProgressStyle};

/// Trees smaller than this finish before a bar is worth drawing.
const MIN_ENTRIES_FOR_PROGRESS: u64 = 10;

/// Advisory progress over the walked entries, drawn on stderr.
pub struct ScanProgress {
    bar: Option<ProgressBar>,
}

impl ScanProgress {
    pub fn new(total_entries: u64, is_tty: bool) -> Self {
        let bar = should_show_progress(total_entries, is_tty).then(|| create_progress_bar(total_entries));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self { bar: None }
    }

    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn should_show_progress(total_entries: u64, is_tty: bool) -> bool {
    total_entries >= MIN_ENTRIES_FOR_PROGRESS && is_tty
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template("{pos:>6}/{len:6} entries {bar:40} {percent:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
