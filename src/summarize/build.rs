// Build-tool log summarization
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use regex::Regex;

use super::{
    clip_entries, dedup_entries, probe_lines, BuildStats, BundleAsset, CodeCount, LogEntry,
    LogLevel, LogSummarizer, LogSummary, Shared, SummaryOptions,
};

/// Summarizes build-tool output: detected tool, build duration, bundle
/// sizes, error/warning classification, and a histogram of structured
/// error codes for the overview
pub struct BuildLogSummarizer {
    shared: Arc<Shared>,
    tools: Vec<(&'static str, Regex)>,
    ts_code: Regex,
    error_line: Regex,
    warning_line: Regex,
    duration: Regex,
    bundle: Regex,
}

impl BuildLogSummarizer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            tools: vec![
                ("webpack", Regex::new(r"(?i)\bwebpack\b").unwrap()),
                ("vite", Regex::new(r"(?i)\bvite\b").unwrap()),
                ("tsc", Regex::new(r"\btsc\b|error TS\d+|(?i)\btypescript\b").unwrap()),
                ("esbuild", Regex::new(r"(?i)\besbuild\b").unwrap()),
                ("rollup", Regex::new(r"(?i)\brollup\b").unwrap()),
                ("npm", Regex::new(r"\bnpm (?:run|install|ci|ERR!)").unwrap()),
            ],
            ts_code: Regex::new(r"error (TS\d+):").unwrap(),
            error_line: Regex::new(
                r"error TS\d+|error\[E\d+\]|^ERROR in |\[(?i:error)\]|^\s*(?i:error)[: ]|: error |✘|✖",
            )
            .unwrap(),
            warning_line: Regex::new(r"^WARNING in |\[(?i:warning|warn)\]|^\s*(?i:warning)[: ]|: warning ")
                .unwrap(),
            duration: Regex::new(
                r"(?i)\b(?:built|compiled|done|finished|bundled)\s+in\s+(\d+(?:\.\d+)?)\s*(ms|s|m)\b",
            )
            .unwrap(),
            bundle: Regex::new(
                r"(\S+\.(?:js|mjs|cjs|css|map))\s+(\d+(?:\.\d+)?\s*(?:[kKmMgG]i?[bB]|bytes|B))\b",
            )
            .unwrap(),
        }
    }

    /// Pick the tool with the highest keyword density; ties resolve by the
    /// fixed registration order
    fn detect_tool(&self, sample: &[&str]) -> Option<&'static str> {
        let mut best: Option<(&'static str, usize)> = None;
        for (name, regex) in &self.tools {
            let hits = sample.iter().filter(|l| regex.is_match(l)).count();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, best_hits)) if hits <= best_hits => {}
                _ => best = Some((name, hits)),
            }
        }
        best.map(|(name, _)| name)
    }

    fn duration_ms(&self, line: &str) -> Option<u64> {
        let caps = self.duration.captures(line)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let ms = match caps.get(2)?.as_str().to_lowercase().as_str() {
            "ms" => value,
            "s" => value * 1000.0,
            "m" => value * 60_000.0,
            _ => return None,
        };
        Some(ms.round() as u64)
    }
}

impl LogSummarizer for BuildLogSummarizer {
    fn name(&self) -> &'static str {
        "build"
    }

    fn can_summarize(&self, text: &str) -> bool {
        let sample = probe_lines(text, self.shared.config.probe_lines);
        if sample.is_empty() {
            return false;
        }
        let has_tool = self.detect_tool(&sample).is_some();
        let has_signal = sample.iter().any(|l| {
            self.error_line.is_match(l)
                || self.warning_line.is_match(l)
                || self.duration.is_match(l)
                || self.bundle.is_match(l)
        });
        has_tool && has_signal
    }

    fn summarize(&self, text: &str, options: &SummaryOptions) -> LogSummary {
        let mut summary = LogSummary::new(self.name());
        let patterns = &self.shared.lines;
        let sample = probe_lines(text, self.shared.config.probe_lines);

        let mut build = BuildStats {
            tool: self.detect_tool(&sample).map(|t| t.to_string()),
            ..BuildStats::default()
        };
        let mut code_index: HashMap<String, usize> = HashMap::new();
        let mut errors: Vec<LogEntry> = Vec::new();
        let mut warnings: Vec<LogEntry> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            summary.statistics.total_lines += 1;
            let timestamp = patterns.timestamp(line);
            summary.statistics.observe_timestamp(timestamp);

            if let Some(ms) = self.duration_ms(line) {
                build.duration_ms = Some(ms);
            }
            if let Some(caps) = self.bundle.captures(line) {
                build.bundle_sizes.push(BundleAsset {
                    name: caps[1].to_string(),
                    size: caps[2].trim().to_string(),
                });
            }
            if let Some(caps) = self.ts_code.captures(line) {
                let code = caps[1].to_string();
                match code_index.get(&code) {
                    Some(&i) => build.error_codes[i].count += 1,
                    None => {
                        code_index.insert(code.clone(), build.error_codes.len());
                        build.error_codes.push(CodeCount { code, count: 1 });
                    }
                }
            }

            if self.error_line.is_match(line) {
                summary.statistics.bump(LogLevel::Error);
                errors.push(LogEntry::new(LogLevel::Error, line.trim(), line).with_timestamp(timestamp));
            } else if self.warning_line.is_match(line) {
                summary.statistics.bump(LogLevel::Warning);
                warnings.push(LogEntry::new(LogLevel::Warning, line.trim(), line).with_timestamp(timestamp));
            } else {
                summary.statistics.bump(patterns.level(line));
            }
        }

        summary.build = Some(build);

        let cap = self.shared.config.max_entries(options.detail);
        let mut errors = dedup_entries(&self.shared.normalizer, errors);
        let mut warnings = dedup_entries(&self.shared.normalizer, warnings);
        summary.clipped_errors = clip_entries(&mut errors, cap);
        summary.clipped_warnings = clip_entries(&mut warnings, cap);
        summary.errors = errors;
        summary.warnings = warnings;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummaryConfig;

    fn summarizer() -> BuildLogSummarizer {
        BuildLogSummarizer::new(Arc::new(Shared::new(SummaryConfig::default())))
    }

    fn tsc_output() -> String {
        "src/a.ts(12,5): error TS2304: Cannot find name 'foo'.\n\
         src/a.ts(20,3): error TS2304: Cannot find name 'bar'.\n\
         src/b.ts(4,1): error TS2551: Property 'lenght' does not exist.\n\
         Found 3 errors in 2 files.\n"
            .to_string()
    }

    #[test]
    fn test_can_summarize_tsc() {
        assert!(summarizer().can_summarize(&tsc_output()));
        assert!(!summarizer().can_summarize("nothing build related here\n"));
    }

    #[test]
    fn test_ts_error_code_histogram() {
        let summary = summarizer().summarize(&tsc_output(), &SummaryOptions::default());
        let build = summary.build.unwrap();
        assert_eq!(build.tool.as_deref(), Some("tsc"));
        assert_eq!(build.error_codes.len(), 2);
        assert_eq!(build.error_codes[0].code, "TS2304");
        assert_eq!(build.error_codes[0].count, 2);
        assert_eq!(build.error_codes[1].code, "TS2551");
        assert_eq!(build.error_codes[1].count, 1);
    }

    #[test]
    fn test_vite_duration_and_bundles() {
        let text = "vite v5.0.0 building for production...\n\
                    dist/index.js 142.3 kB\n\
                    dist/style.css 12.1 kB\n\
                    ✓ built in 3.21s\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let build = summary.build.unwrap();
        assert_eq!(build.tool.as_deref(), Some("vite"));
        assert_eq!(build.duration_ms, Some(3210));
        assert_eq!(build.bundle_sizes.len(), 2);
        assert_eq!(build.bundle_sizes[0].name, "dist/index.js");
        assert_eq!(build.bundle_sizes[0].size, "142.3 kB");
    }

    #[test]
    fn test_webpack_errors() {
        let text = "webpack 5.90.0 compiled with 1 error in 4200 ms\n\
                    ERROR in ./src/app.js\n\
                    Module not found: Error: Can't resolve './missing'\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        let build = summary.build.unwrap();
        assert_eq!(build.tool.as_deref(), Some("webpack"));
        assert!(!summary.errors.is_empty());
    }

    #[test]
    fn test_duplicate_errors_dedup() {
        let summary = summarizer().summarize(&tsc_output(), &SummaryOptions::default());
        // Two TS2304 lines differ only in location and quoted name
        let first = &summary.errors[0];
        assert_eq!(first.count, 2);
    }
}
