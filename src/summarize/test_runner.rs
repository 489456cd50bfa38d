// Test-runner log summarization
use std::sync::Arc;

use regex::Regex;

use super::{
    clip_entries, dedup_entries, probe_lines, LogEntry, LogLevel, LogSummarizer, LogSummary,
    Shared, SummaryOptions, TestStats,
};

/// Summarizes test-runner output across several runner conventions
///
/// Per-test pass/fail/skip lines are counted, but a machine summary line
/// ("5 passed, 1 failed in 2.3s", "Tests: …", "test result: …") is
/// authoritative over the per-test count when present.
pub struct TestLogSummarizer {
    shared: Arc<Shared>,
    pass_line: Regex,
    fail_line: Regex,
    skip_line: Regex,
    summary_line: Regex,
    passed_n: Regex,
    failed_n: Regex,
    skipped_n: Regex,
    seconds: Regex,
}

impl TestLogSummarizer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            pass_line: Regex::new(r"^\s*(?:✓|✔)|^\s*PASS\b|^test .+ \.\.\. ok$|^ok \d+|\bPASSED\b")
                .unwrap(),
            fail_line: Regex::new(
                r"^\s*(?:✗|✘|×)|^\s*FAIL\b|^test .+ \.\.\. FAILED$|^not ok \d+|\bFAILED\b",
            )
            .unwrap(),
            skip_line: Regex::new(r"^\s*(?:○|↓)|^\s*SKIP\b|^test .+ \.\.\. ignored$|\bSKIPPED\b")
                .unwrap(),
            summary_line: Regex::new(
                r"^\s*Tests:\s|^test result:|\b\d+\s+passed\b.*\bin\s+\d+(?:\.\d+)?s",
            )
            .unwrap(),
            passed_n: Regex::new(r"(\d+)\s+passed").unwrap(),
            failed_n: Regex::new(r"(\d+)\s+failed").unwrap(),
            skipped_n: Regex::new(r"(\d+)\s+(?:skipped|ignored|pending)").unwrap(),
            seconds: Regex::new(r"\bin\s+(\d+(?:\.\d+)?)\s*s\b|\bTime:\s+(\d+(?:\.\d+)?)\s*s\b")
                .unwrap(),
        }
    }

    fn capture_count(regex: &Regex, line: &str) -> Option<usize> {
        regex
            .captures(line)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn parse_summary(&self, line: &str) -> TestStats {
        let duration_ms = self.seconds.captures(line).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .map(|secs| (secs * 1000.0).round() as u64)
        });
        TestStats {
            pass_count: Self::capture_count(&self.passed_n, line).unwrap_or(0),
            fail_count: Self::capture_count(&self.failed_n, line).unwrap_or(0),
            skip_count: Self::capture_count(&self.skipped_n, line).unwrap_or(0),
            duration_ms,
        }
    }
}

impl LogSummarizer for TestLogSummarizer {
    fn name(&self) -> &'static str {
        "test"
    }

    fn can_summarize(&self, text: &str) -> bool {
        let sample = probe_lines(text, self.shared.config.probe_lines);
        if sample.is_empty() {
            return false;
        }
        if sample.iter().any(|l| self.summary_line.is_match(l)) {
            return true;
        }
        // A single checkmark line also shows up in bundler output, so
        // per-test evidence requires at least two hits
        let hits = sample
            .iter()
            .filter(|l| {
                self.pass_line.is_match(l) || self.fail_line.is_match(l) || self.skip_line.is_match(l)
            })
            .count();
        hits >= 2 && hits as f32 / sample.len() as f32 >= self.shared.config.test_hit_rate
    }

    fn summarize(&self, text: &str, options: &SummaryOptions) -> LogSummary {
        let mut summary = LogSummary::new(self.name());
        let patterns = &self.shared.lines;
        let mut counted = TestStats::default();
        let mut from_summary: Option<TestStats> = None;
        let mut errors: Vec<LogEntry> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            summary.statistics.total_lines += 1;
            let timestamp = patterns.timestamp(line);
            summary.statistics.observe_timestamp(timestamp);

            if self.summary_line.is_match(line) {
                // Last summary line wins; runners print it at the end
                from_summary = Some(self.parse_summary(line));
                summary.statistics.bump(LogLevel::Info);
                continue;
            }

            if self.fail_line.is_match(line) {
                counted.fail_count += 1;
                summary.statistics.bump(LogLevel::Error);
                errors.push(LogEntry::new(LogLevel::Error, line.trim(), line).with_timestamp(timestamp));
            } else if self.pass_line.is_match(line) {
                counted.pass_count += 1;
                summary.statistics.bump(LogLevel::Info);
            } else if self.skip_line.is_match(line) {
                counted.skip_count += 1;
                summary.statistics.bump(LogLevel::Info);
            } else {
                summary.statistics.bump(patterns.level(line));
            }
        }

        summary.tests = Some(from_summary.unwrap_or(counted));

        let cap = self.shared.config.max_entries(options.detail);
        let mut errors = dedup_entries(&self.shared.normalizer, errors);
        summary.clipped_errors = clip_entries(&mut errors, cap);
        summary.errors = errors;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummaryConfig;

    fn summarizer() -> TestLogSummarizer {
        TestLogSummarizer::new(Arc::new(Shared::new(SummaryConfig::default())))
    }

    #[test]
    fn test_summary_line_is_authoritative() {
        // Only three per-test lines are visible, summary says five
        let text = "✓ creates a user\n\
                    ✓ rejects duplicates\n\
                    ✗ handles timeouts\n\
                    5 passed, 1 failed in 2.3s\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let tests = summary.tests.unwrap();
        assert_eq!(tests.pass_count, 5);
        assert_eq!(tests.fail_count, 1);
        assert_eq!(tests.duration_ms, Some(2300));
    }

    #[test]
    fn test_counts_individual_lines_without_summary() {
        let text = "✓ first\n✓ second\n✗ third\n○ fourth\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let tests = summary.tests.unwrap();
        assert_eq!(tests.pass_count, 2);
        assert_eq!(tests.fail_count, 1);
        assert_eq!(tests.skip_count, 1);
        assert_eq!(tests.duration_ms, None);
    }

    #[test]
    fn test_cargo_conventions() {
        let text = "test parser::tests::test_basic ... ok\n\
                    test parser::tests::test_edge ... FAILED\n\
                    test parser::tests::test_slow ... ignored\n\
                    test result: FAILED. 1 passed; 1 failed; 1 ignored; 0 measured; finished in 0.32s\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let tests = summary.tests.unwrap();
        assert_eq!(tests.pass_count, 1);
        assert_eq!(tests.fail_count, 1);
        assert_eq!(tests.skip_count, 1);
        assert_eq!(tests.duration_ms, Some(320));
    }

    #[test]
    fn test_jest_summary() {
        let text = "PASS src/app.test.ts\n\
                    Tests: 2 failed, 1 skipped, 17 passed, 20 total\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let tests = summary.tests.unwrap();
        assert_eq!(tests.pass_count, 17);
        assert_eq!(tests.fail_count, 2);
        assert_eq!(tests.skip_count, 1);
    }

    #[test]
    fn test_failed_tests_become_error_entries() {
        let text = "✗ handles timeouts\n✗ handles retries\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.errors.len(), 2);
    }

    #[test]
    fn test_can_summarize() {
        assert!(summarizer().can_summarize("5 passed, 1 failed in 2.3s\n"));
        assert!(summarizer().can_summarize("✓ one\n✓ two\n✗ three\n"));
        assert!(!summarizer().can_summarize("plain prose\nmore prose\nstill prose\n"));
    }
}
