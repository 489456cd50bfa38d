// Generic fallback summarization for arbitrary logs
use std::sync::Arc;

use super::{
    clip_entries, dedup_entries, LogEntry, LogLevel, LogSummarizer, LogSummary, Shared,
    SummaryOptions,
};

/// Always-applicable fallback: per-level classification, key events, and
/// the statistics baseline every other summarizer extends
pub struct GenericLogSummarizer {
    shared: Arc<Shared>,
}

impl GenericLogSummarizer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl LogSummarizer for GenericLogSummarizer {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn can_summarize(&self, _text: &str) -> bool {
        true
    }

    fn summarize(&self, text: &str, options: &SummaryOptions) -> LogSummary {
        let mut summary = LogSummary::new(self.name());
        let patterns = &self.shared.lines;
        let mut errors: Vec<LogEntry> = Vec::new();
        let mut warnings: Vec<LogEntry> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            summary.statistics.total_lines += 1;
            let timestamp = patterns.timestamp(line);
            summary.statistics.observe_timestamp(timestamp);

            let level = patterns.level(line);
            summary.statistics.bump(level);
            match level {
                LogLevel::Error => {
                    errors.push(LogEntry::new(level, line.trim(), line).with_timestamp(timestamp))
                }
                LogLevel::Warning => {
                    warnings.push(LogEntry::new(level, line.trim(), line).with_timestamp(timestamp))
                }
                _ => {
                    if patterns.is_key_event(line) {
                        summary
                            .key_events
                            .push(LogEntry::new(level, line.trim(), line).with_timestamp(timestamp));
                    }
                }
            }
        }

        let cap = self.shared.config.max_entries(options.detail);
        let mut errors = dedup_entries(&self.shared.normalizer, errors);
        let mut warnings = dedup_entries(&self.shared.normalizer, warnings);
        summary.clipped_errors = clip_entries(&mut errors, cap);
        summary.clipped_warnings = clip_entries(&mut warnings, cap);
        clip_entries(&mut summary.key_events, cap);
        summary.errors = errors;
        summary.warnings = warnings;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Detail;
    use crate::config::SummaryConfig;

    fn summarizer() -> GenericLogSummarizer {
        GenericLogSummarizer::new(Arc::new(Shared::new(SummaryConfig::default())))
    }

    #[test]
    fn test_level_counts() {
        let text = "2024-01-15 10:00:00 [INFO] server started\n\
                    2024-01-15 10:00:05 [ERROR] connection refused\n\
                    2024-01-15 10:00:06 [WARN] retrying with backoff\n\
                    2024-01-15 10:00:10 [ERROR] connection refused\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.statistics.total_lines, 4);
        assert_eq!(summary.statistics.error_count, 2);
        assert_eq!(summary.statistics.warning_count, 1);
        assert_eq!(summary.statistics.info_count, 1);
    }

    #[test]
    fn test_timespan() {
        let text = "2024-01-15 10:00:00 [INFO] a\n2024-01-15 10:15:00 [INFO] b\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let span = summary.statistics.timespan.unwrap();
        assert_eq!(span.duration_ms(), 15 * 60 * 1000);
    }

    #[test]
    fn test_key_events() {
        let text = "[INFO] server started on port 8080\n\
                    [INFO] nothing in particular\n\
                    [INFO] listening for connections\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.key_events.len(), 2);
    }

    #[test]
    fn test_dedup_and_clip_reflected_in_stats() {
        let mut text = String::new();
        for i in 0..30 {
            text.push_str(&format!("[ERROR] distinct failure number {} occurred\n", i));
        }
        let summary = summarizer().summarize(
            &text,
            &SummaryOptions {
                detail: Detail::Minimal,
            },
        );
        assert_eq!(summary.errors.len(), 5);
        assert_eq!(summary.clipped_errors, 25);
        assert_eq!(summary.statistics.error_count, 30);
    }

    #[test]
    fn test_repeated_errors_collapse() {
        let text = "[ERROR] timeout talking to 'db-1'\n\
                    [ERROR] timeout talking to 'db-2'\n\
                    [ERROR] timeout talking to 'db-3'\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].count, 3);
    }

    #[test]
    fn test_render_contains_counts() {
        let text = "[ERROR] boom\n[ERROR] boom\n[INFO] fine\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let rendered = summary.render();
        assert!(rendered.contains("errors: 2"));
        assert!(rendered.contains("(×2)"));
    }
}
