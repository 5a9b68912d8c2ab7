use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use anyhow::{Context, Result};
use std::ffi::OsString;

/// Literal multi-pattern search over raw file bytes.
///
/// Every pattern is reported independently, so overlapping and duplicate
/// patterns all show up in the result.
pub struct ContentMatcher {
    automaton: AhoCorasick,
    patterns: Vec<OsString>,
}

impl ContentMatcher {
    pub fn new(patterns: &[OsString]) -> Result<Self> {
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(patterns.iter().map(|pattern| pattern.as_encoded_bytes()))
            .context("Failed to build content pattern automaton")?;

        Ok(Self {
            automaton,
            patterns: patterns.to_vec(),
        })
    }

    /// Returns the patterns found in `haystack`, in the order they were configured.
    pub fn scan(&self, haystack: &[u8]) -> Vec<OsString> {
        let mut found = vec![false; self.patterns.len()];
        let mut remaining = self.patterns.len();

        for hit in self.automaton.find_overlapping_iter(haystack) {
            let seen = &mut found[hit.pattern().as_usize()];
            if !*seen {
                *seen = true;
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }

        self.patterns
            .iter()
            .zip(found)
            .filter_map(|(pattern, hit)| hit.then(|| pattern.clone()))
            .collect()
    }
}
