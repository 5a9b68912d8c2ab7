use crate::app::models::{ScanReport, Settings};

const SKIP_RULE: &str = "--------------------------------------------------";
const MATCH_RULE: &str = "==================================================";

pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders the whole report. Skip details only appear in verbose mode.
    pub fn render(report: &ScanReport, settings: &Settings) -> String {
        let mut output = String::new();

        if settings.verbose {
            output.push_str(&Self::generate_skip_details(report));
        }
        output.push_str(&Self::generate_matches(report));
        output.push_str(&Self::generate_summary(report, settings));

        output
    }

    pub fn generate_skip_details(report: &ScanReport) -> String {
        let mut out = String::new();

        if !report.exceptions.is_empty() {
            let lines: Vec<String> = report
                .exceptions
                .iter()
                .map(|e| format!("{} | {}", e.message, e.path.display()))
                .collect();
            out.push_str(&section(
                &format!("Skipped the following {} files due to exceptions.", lines.len()),
                SKIP_RULE,
                &lines,
            ));
        }

        if !report.unreadable.is_empty() {
            let lines: Vec<String> = report
                .unreadable
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            out.push_str(&section(
                &format!("Skipped the following {} files due to stream failures.", lines.len()),
                SKIP_RULE,
                &lines,
            ));
        }

        if !report.oversize.is_empty() {
            let lines: Vec<String> = report
                .oversize
                .iter()
                .map(|o| format!("{} Bytes | {}", o.size, o.path.display()))
                .collect();
            out.push_str(&section(
                &format!(
                    "Skipped the following {} files as they exceeded the maximum file size.",
                    lines.len()
                ),
                SKIP_RULE,
                &lines,
            ));
        }

        out
    }

    pub fn generate_matches(report: &ScanReport) -> String {
        if report.matches.is_empty() {
            return String::new();
        }

        let lines: Vec<String> = report
            .matches
            .iter()
            .map(|m| {
                let patterns: Vec<_> = m.patterns.iter().map(|p| p.to_string_lossy()).collect();
                format!("{{{}}} | Matched in > {}", patterns.join(", "), m.path.display())
            })
            .collect();

        section(
            "The following files matched one or more patterns.",
            MATCH_RULE,
            &lines,
        )
    }

    pub fn generate_summary(report: &ScanReport, settings: &Settings) -> String {
        let mut out = format!(
            "Searched through {} file(s) for {} pattern(s).\n",
            report.files_examined,
            settings.content_patterns.len()
        );
        out.push_str(&format!("Skipped {} file(s) due to excess size.\n", report.oversize.len()));
        out.push_str(&format!("Skipped {} file(s) due to exception(s).\n", report.exceptions.len()));
        out.push_str(&format!(
            "Skipped {} file(s) due to stream failure(s).\n",
            report.unreadable.len()
        ));
        if report.halted {
            out.push_str("Stopped early after reaching the maximum file count.\n");
        }
        out.push_str(&format!("\nMatched {} file(s).\n", report.matches.len()));
        out
    }
}

fn section(title: &str, rule: &str, lines: &[String]) -> String {
    let mut out = format!("{}\n{}\n", title, rule);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(rule);
    out.push_str("\n\n");
    out
}
