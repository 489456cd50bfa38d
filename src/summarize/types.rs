// Shared types for log summarization
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::compress::Detail;

/// Severity of one log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// One parsed log line
///
/// `count` starts at 1 and grows only through explicit deduplication,
/// never through re-parsing.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogLevel,
    pub message: String,
    pub count: usize,
    pub raw: String,
    pub context: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            level,
            message: message.into(),
            count: 1,
            raw: raw.into(),
            context: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// First/last timestamp seen in one summarize call
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Timespan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Timespan {
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

/// Aggregate line statistics for one summarize call
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogStatistics {
    pub total_lines: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    pub timespan: Option<Timespan>,
}

impl LogStatistics {
    pub fn bump(&mut self, level: LogLevel) {
        match level {
            LogLevel::Error => self.error_count += 1,
            LogLevel::Warning => self.warning_count += 1,
            LogLevel::Info => self.info_count += 1,
            LogLevel::Debug => self.debug_count += 1,
        }
    }

    pub fn observe_timestamp(&mut self, ts: Option<DateTime<Utc>>) {
        let Some(ts) = ts else { return };
        self.timespan = Some(match self.timespan {
            None => Timespan { start: ts, end: ts },
            Some(span) => Timespan {
                start: span.start.min(ts),
                end: span.end.max(ts),
            },
        });
    }
}

/// Per-endpoint aggregation for server logs
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStats {
    /// Normalized endpoint, e.g. `GET /api/users/:id`
    pub endpoint: String,
    pub count: usize,
    pub avg_response_ms: f32,
    pub error_count: usize,
}

/// Pass/fail accounting for test-runner logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestStats {
    pub pass_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleAsset {
    pub name: String,
    pub size: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeCount {
    pub code: String,
    pub count: usize,
}

/// Build-tool specifics for build logs
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub tool: Option<String>,
    pub duration_ms: Option<u64>,
    pub bundle_sizes: Vec<BundleAsset>,
    /// Histogram of structured error codes (e.g. TS2304), first-seen order
    pub error_codes: Vec<CodeCount>,
}

/// Terminal, read-only output of one summarize call
#[derive(Debug, Clone, Serialize)]
pub struct LogSummary {
    /// Name of the summarizer family that produced this summary
    pub summarizer: String,
    pub statistics: LogStatistics,
    pub errors: Vec<LogEntry>,
    pub warnings: Vec<LogEntry>,
    pub key_events: Vec<LogEntry>,
    /// Populated by the server summarizer only
    pub endpoints: Vec<EndpointStats>,
    pub tests: Option<TestStats>,
    pub build: Option<BuildStats>,
    /// Entries dropped by the detail-level cap, so clipping is detectable
    pub clipped_errors: usize,
    pub clipped_warnings: usize,
}

impl LogSummary {
    pub fn new(summarizer: &str) -> Self {
        Self {
            summarizer: summarizer.to_string(),
            statistics: LogStatistics::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            key_events: Vec::new(),
            endpoints: Vec::new(),
            tests: None,
            build: None,
            clipped_errors: 0,
            clipped_warnings: 0,
        }
    }

    /// Render the summary as plain text with deterministic ordering
    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = &self.statistics;
        out.push_str(&format!("## {} log summary\n", self.summarizer));
        out.push_str(&format!(
            "lines: {} · errors: {} · warnings: {} · info: {} · debug: {}\n",
            s.total_lines, s.error_count, s.warning_count, s.info_count, s.debug_count
        ));
        if let Some(span) = &s.timespan {
            out.push_str(&format!(
                "timespan: {} → {} ({}ms)\n",
                span.start.format("%Y-%m-%d %H:%M:%S"),
                span.end.format("%Y-%m-%d %H:%M:%S"),
                span.duration_ms()
            ));
        }

        if let Some(tests) = &self.tests {
            out.push_str(&format!(
                "tests: {} passed, {} failed, {} skipped",
                tests.pass_count, tests.fail_count, tests.skip_count
            ));
            if let Some(ms) = tests.duration_ms {
                out.push_str(&format!(" in {}ms", ms));
            }
            out.push('\n');
        }

        if let Some(build) = &self.build {
            if let Some(tool) = &build.tool {
                out.push_str(&format!("build tool: {}\n", tool));
            }
            if let Some(ms) = build.duration_ms {
                out.push_str(&format!("build duration: {}ms\n", ms));
            }
            if !build.bundle_sizes.is_empty() {
                out.push_str("bundles:\n");
                for asset in &build.bundle_sizes {
                    out.push_str(&format!("  {} {}\n", asset.name, asset.size));
                }
            }
            if !build.error_codes.is_empty() {
                out.push_str("error codes:\n");
                for code in &build.error_codes {
                    out.push_str(&format!("  {} ×{}\n", code.code, code.count));
                }
            }
        }

        if !self.endpoints.is_empty() {
            out.push_str("endpoints:\n");
            for ep in &self.endpoints {
                out.push_str(&format!(
                    "  {} — {} requests, avg {:.1}ms, {} errors\n",
                    ep.endpoint, ep.count, ep.avg_response_ms, ep.error_count
                ));
            }
        }

        render_entries(&mut out, "errors", &self.errors, self.clipped_errors);
        render_entries(&mut out, "warnings", &self.warnings, self.clipped_warnings);
        render_entries(&mut out, "key events", &self.key_events, 0);

        out.trim_end().to_string()
    }
}

fn render_entries(out: &mut String, title: &str, entries: &[LogEntry], clipped: usize) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("{}:\n", title));
    for entry in entries {
        out.push_str(&format!("  {}", entry.message));
        if entry.count > 1 {
            out.push_str(&format!(" (×{})", entry.count));
        }
        out.push('\n');
    }
    if clipped > 0 {
        out.push_str(&format!("  +{} more\n", clipped));
    }
}

/// Options for one summarize call
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    pub detail: Detail,
}
