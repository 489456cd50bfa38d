//! Log summarizers: one per log family, behind a single trait
//!
//! The concrete summarizer set is enumerated once in [`SummarizerSet`] with
//! a fixed registration order (server → test → build → generic); selection
//! takes the first applicable summarizer and the generic one is always
//! applicable as the fallback. Every summarizer deduplicates its
//! error/warning lists through the signature mechanism before truncating to
//! the detail-level cap.

mod build;
mod generic;
mod server;
mod test_runner;
mod types;

pub use build::BuildLogSummarizer;
pub use generic::GenericLogSummarizer;
pub use server::ServerLogSummarizer;
pub use test_runner::TestLogSummarizer;
pub use types::{
    BuildStats, BundleAsset, CodeCount, EndpointStats, LogEntry, LogLevel, LogStatistics,
    LogSummary, SummaryOptions, TestStats, Timespan,
};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::SummaryConfig;
use crate::signature::Normalizer;

/// One log family summarizer
pub trait LogSummarizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap applicability probe over the first ~100 lines
    fn can_summarize(&self, text: &str) -> bool;

    fn summarize(&self, text: &str, options: &SummaryOptions) -> LogSummary;
}

/// State shared by all summarizers in one set: the signature normalizer
/// for dedup, the level/timestamp patterns, and the entry caps
pub(crate) struct Shared {
    pub normalizer: Normalizer,
    pub config: SummaryConfig,
    pub lines: LinePatterns,
}

impl Shared {
    fn new(config: SummaryConfig) -> Self {
        Self {
            normalizer: Normalizer::new(),
            config,
            lines: LinePatterns::new(),
        }
    }
}

/// Level and timestamp detection shared across log families
pub(crate) struct LinePatterns {
    error: Regex,
    warning: Regex,
    debug: Regex,
    timestamp: Regex,
    key_event: Regex,
}

impl LinePatterns {
    fn new() -> Self {
        Self {
            error: Regex::new(
                r"\[(?i:error|err|fatal|critical)\]|(?:^|\s)(?:ERROR|FATAL)[:\s]|level=(?i:error|fatal)|^(?i:error)[: ]",
            )
            .unwrap(),
            warning: Regex::new(
                r"\[(?i:warn|warning)\]|(?:^|\s)(?:WARN|WARNING)[:\s]|level=(?i:warn|warning)|^(?i:warning)[: ]",
            )
            .unwrap(),
            debug: Regex::new(
                r"\[(?i:debug|trace)\]|(?:^|\s)(?:DEBUG|TRACE)[:\s]|level=(?i:debug|trace)",
            )
            .unwrap(),
            timestamp: Regex::new(r"(\d{4}-\d{2}-\d{2})[T ](\d{2}:\d{2}:\d{2})").unwrap(),
            key_event: Regex::new(
                r"(?i)\b(?:started|starting|listening|connected|disconnected|shutting down|shutdown|stopped|deployed|initialized|ready|migrated)\b",
            )
            .unwrap(),
        }
    }

    /// Classify one line; unmatched lines degrade to `info`
    pub fn level(&self, line: &str) -> LogLevel {
        if self.error.is_match(line) {
            LogLevel::Error
        } else if self.warning.is_match(line) {
            LogLevel::Warning
        } else if self.debug.is_match(line) {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }

    pub fn timestamp(&self, line: &str) -> Option<DateTime<Utc>> {
        let caps = self.timestamp.captures(line)?;
        let joined = format!("{} {}", &caps[1], &caps[2]);
        chrono::NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|dt| dt.and_utc())
    }

    pub fn is_key_event(&self, line: &str) -> bool {
        self.key_event.is_match(line)
    }
}

/// Merge entries whose normalized message signature matches, keeping
/// first-seen order and accumulating counts
pub(crate) fn dedup_entries(normalizer: &Normalizer, entries: Vec<LogEntry>) -> Vec<LogEntry> {
    let mut out: Vec<LogEntry> = Vec::new();
    let mut index: ahash::HashMap<String, usize> = ahash::HashMap::default();

    for entry in entries {
        let key = normalizer.normalize(&entry.message);
        match index.get(&key) {
            Some(&i) => out[i].count += entry.count,
            None => {
                index.insert(key, out.len());
                out.push(entry);
            }
        }
    }
    out
}

/// Truncate to the detail-level cap; returns how many entries were dropped
pub(crate) fn clip_entries(entries: &mut Vec<LogEntry>, cap: usize) -> usize {
    let dropped = entries.len().saturating_sub(cap);
    entries.truncate(cap);
    dropped
}

/// First `limit` non-blank lines, for applicability probes
pub(crate) fn probe_lines(text: &str, limit: usize) -> Vec<&str> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .take(limit)
        .collect()
}

/// The concrete summarizer set in fixed priority order
pub struct SummarizerSet {
    summarizers: Vec<Box<dyn LogSummarizer>>,
}

impl SummarizerSet {
    pub fn new(config: SummaryConfig) -> Self {
        let shared = Arc::new(Shared::new(config));
        Self {
            summarizers: vec![
                Box::new(ServerLogSummarizer::new(shared.clone())),
                Box::new(TestLogSummarizer::new(shared.clone())),
                Box::new(BuildLogSummarizer::new(shared.clone())),
                Box::new(GenericLogSummarizer::new(shared)),
            ],
        }
    }

    /// First applicable summarizer wins; generic is always applicable
    pub fn select(&self, text: &str) -> &dyn LogSummarizer {
        self.summarizers
            .iter()
            .find(|s| s.can_summarize(text))
            .unwrap_or_else(|| self.summarizers.last().expect("generic summarizer registered"))
            .as_ref()
    }

    pub fn summarize(&self, text: &str, options: &SummaryOptions) -> LogSummary {
        self.select(text).summarize(text, options)
    }

    /// Fetch one summarizer by family name
    pub fn by_name(&self, name: &str) -> Option<&dyn LogSummarizer> {
        self.summarizers
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.summarizers.iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order() {
        let set = SummarizerSet::new(SummaryConfig::default());
        assert_eq!(set.names(), vec!["server", "test", "build", "generic"]);
    }

    #[test]
    fn test_generic_is_fallback() {
        let set = SummarizerSet::new(SummaryConfig::default());
        let selected = set.select("completely unremarkable text\nwith no structure\n");
        assert_eq!(selected.name(), "generic");
    }

    #[test]
    fn test_level_detection() {
        let patterns = LinePatterns::new();
        assert_eq!(patterns.level("[ERROR] boom"), LogLevel::Error);
        assert_eq!(patterns.level("2024-01-01 WARN: careful"), LogLevel::Warning);
        assert_eq!(patterns.level("level=debug starting loop"), LogLevel::Debug);
        assert_eq!(patterns.level("hello world"), LogLevel::Info);
    }

    #[test]
    fn test_timestamp_parsing() {
        let patterns = LinePatterns::new();
        let ts = patterns.timestamp("2024-01-15T10:30:45 [INFO] ready").unwrap();
        assert_eq!(ts.format("%H:%M:%S").to_string(), "10:30:45");
        assert!(patterns.timestamp("no timestamp here").is_none());
    }

    #[test]
    fn test_dedup_entries_merges_counts() {
        let normalizer = Normalizer::new();
        let entries = vec![
            LogEntry::new(LogLevel::Error, "cannot open 'a.txt'", "raw1"),
            LogEntry::new(LogLevel::Error, "cannot open 'b.txt'", "raw2"),
            LogEntry::new(LogLevel::Error, "disk full", "raw3"),
        ];
        let deduped = dedup_entries(&normalizer, entries);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].count, 2);
        assert_eq!(deduped[1].count, 1);
    }

    #[test]
    fn test_clip_entries_reports_dropped() {
        let mut entries: Vec<LogEntry> = (0..8)
            .map(|i| LogEntry::new(LogLevel::Error, format!("e{}", i), ""))
            .collect();
        let dropped = clip_entries(&mut entries, 5);
        assert_eq!(dropped, 3);
        assert_eq!(entries.len(), 5);
    }
}
