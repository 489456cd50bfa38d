// Server/HTTP log summarization
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use regex::Regex;

use super::{
    clip_entries, dedup_entries, probe_lines, EndpointStats, LogEntry, LogLevel, LogSummarizer,
    LogSummary, Shared, SummaryOptions,
};

struct Request {
    method: String,
    path: String,
    status: u16,
    response_ms: Option<f32>,
}

struct EndpointAgg {
    endpoint: String,
    count: usize,
    total_ms: f32,
    timed: usize,
    error_count: usize,
}

/// Summarizes HTTP server logs: per-endpoint counts, average latency, and
/// error rates, with path variables normalized before aggregation
pub struct ServerLogSummarizer {
    shared: Arc<Shared>,
    combined: Regex,
    key_value: Regex,
    plain: Regex,
    uuid_segment: Regex,
    object_id_segment: Regex,
}

impl ServerLogSummarizer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            // Combined log format: "GET /path HTTP/1.1" 200 512
            combined: Regex::new(
                r#""(?P<method>GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s+(?P<path>[^\s"]+)(?:\s+HTTP/[\d.]+)?"\s+(?P<status>\d{3})"#,
            )
            .unwrap(),
            // key=value style: method=GET path=/x status=200 duration=12ms
            key_value: Regex::new(
                r"method=(?P<method>[A-Z]+)\s.*?(?:path|url)=(?P<path>\S+).*?status=(?P<status>\d{3})(?:.*?(?:duration|response_time|time)=(?P<ms>\d+(?:\.\d+)?)\s*ms)?",
            )
            .unwrap(),
            // Plain: GET /path 200 15ms
            plain: Regex::new(
                r#"\b(?P<method>GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s+(?P<path>/[^\s"]*)\s+(?P<status>\d{3})\b(?:\s+(?P<ms>\d+(?:\.\d+)?)\s*ms)?"#,
            )
            .unwrap(),
            uuid_segment: Regex::new(
                r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
            )
            .unwrap(),
            object_id_segment: Regex::new(r"^[0-9a-fA-F]{24}$").unwrap(),
        }
    }

    fn parse_request(&self, line: &str) -> Option<Request> {
        for regex in [&self.combined, &self.key_value, &self.plain] {
            if let Some(caps) = regex.captures(line) {
                let status: u16 = caps.name("status")?.as_str().parse().ok()?;
                return Some(Request {
                    method: caps.name("method")?.as_str().to_string(),
                    path: caps.name("path")?.as_str().to_string(),
                    status,
                    response_ms: caps
                        .name("ms")
                        .and_then(|m| m.as_str().parse::<f32>().ok()),
                });
            }
        }
        None
    }

    /// Replace numeric, UUID, and ObjectId path segments with placeholders
    /// so endpoints aggregate across resource ids
    fn normalize_path(&self, path: &str) -> String {
        let path = path.split('?').next().unwrap_or(path);
        path.split('/')
            .map(|segment| {
                if segment.is_empty() {
                    segment.to_string()
                } else if segment.chars().all(|c| c.is_ascii_digit()) {
                    ":id".to_string()
                } else if self.uuid_segment.is_match(segment) {
                    ":uuid".to_string()
                } else if self.object_id_segment.is_match(segment) {
                    ":id".to_string()
                } else {
                    segment.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl LogSummarizer for ServerLogSummarizer {
    fn name(&self) -> &'static str {
        "server"
    }

    fn can_summarize(&self, text: &str) -> bool {
        let sample = probe_lines(text, self.shared.config.probe_lines);
        if sample.is_empty() {
            return false;
        }
        let hits = sample
            .iter()
            .filter(|l| self.parse_request(l).is_some())
            .count();
        hits as f32 / sample.len() as f32 >= self.shared.config.server_hit_rate
    }

    fn summarize(&self, text: &str, options: &SummaryOptions) -> LogSummary {
        let mut summary = LogSummary::new(self.name());
        let patterns = &self.shared.lines;
        let mut aggregates: Vec<EndpointAgg> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut errors: Vec<LogEntry> = Vec::new();
        let mut warnings: Vec<LogEntry> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            summary.statistics.total_lines += 1;
            let timestamp = patterns.timestamp(line);
            summary.statistics.observe_timestamp(timestamp);

            if let Some(request) = self.parse_request(line) {
                let normalized = self.normalize_path(&request.path);
                let key = format!("{} {}", request.method, normalized);
                let agg = match index.get(&key) {
                    Some(&i) => &mut aggregates[i],
                    None => {
                        index.insert(key.clone(), aggregates.len());
                        aggregates.push(EndpointAgg {
                            endpoint: key,
                            count: 0,
                            total_ms: 0.0,
                            timed: 0,
                            error_count: 0,
                        });
                        aggregates.last_mut().unwrap()
                    }
                };
                agg.count += 1;
                if let Some(ms) = request.response_ms {
                    agg.total_ms += ms;
                    agg.timed += 1;
                }

                // 5xx responses are errors, 4xx are warnings
                let message = format!("{} {} {}", request.method, normalized, request.status);
                if request.status >= 500 {
                    agg.error_count += 1;
                    summary.statistics.bump(LogLevel::Error);
                    errors.push(LogEntry::new(LogLevel::Error, message, line).with_timestamp(timestamp));
                } else if request.status >= 400 {
                    agg.error_count += 1;
                    summary.statistics.bump(LogLevel::Warning);
                    warnings
                        .push(LogEntry::new(LogLevel::Warning, message, line).with_timestamp(timestamp));
                } else {
                    summary.statistics.bump(LogLevel::Info);
                }
            } else {
                let level = patterns.level(line);
                summary.statistics.bump(level);
                match level {
                    LogLevel::Error => {
                        errors.push(LogEntry::new(level, line.trim(), line).with_timestamp(timestamp))
                    }
                    LogLevel::Warning => warnings
                        .push(LogEntry::new(level, line.trim(), line).with_timestamp(timestamp)),
                    _ => {
                        if patterns.is_key_event(line) {
                            summary
                                .key_events
                                .push(LogEntry::new(level, line.trim(), line).with_timestamp(timestamp));
                        }
                    }
                }
            }
        }

        summary.endpoints = aggregates
            .into_iter()
            .map(|agg| EndpointStats {
                endpoint: agg.endpoint,
                count: agg.count,
                avg_response_ms: if agg.timed > 0 {
                    agg.total_ms / agg.timed as f32
                } else {
                    0.0
                },
                error_count: agg.error_count,
            })
            .collect();

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
    use crate::config::SummaryConfig;

    fn summarizer() -> ServerLogSummarizer {
        ServerLogSummarizer::new(Arc::new(Shared::new(SummaryConfig::default())))
    }

    fn access_log() -> String {
        let mut text = String::new();
        for i in 0..10 {
            text.push_str(&format!("GET /api/users/{} 200 15ms\n", 40 + i));
        }
        text.push_str("GET /api/users/43 404 5ms\n");
        text.push_str("GET /api/users/44 404 5ms\n");
        text
    }

    #[test]
    fn test_can_summarize_access_log() {
        assert!(summarizer().can_summarize(&access_log()));
        assert!(!summarizer().can_summarize("prose line\nanother prose line\n"));
    }

    #[test]
    fn test_endpoint_aggregation() {
        let summary = summarizer().summarize(&access_log(), &SummaryOptions::default());
        assert_eq!(summary.endpoints.len(), 1);
        let ep = &summary.endpoints[0];
        assert_eq!(ep.endpoint, "GET /api/users/:id");
        assert_eq!(ep.count, 12);
        assert!((ep.avg_response_ms - (15.0 * 10.0 + 5.0 * 2.0) / 12.0).abs() < 0.01);
        assert_eq!(ep.error_count, 2);
    }

    #[test]
    fn test_4xx_become_warnings() {
        let summary = summarizer().summarize(&access_log(), &SummaryOptions::default());
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].count, 2);
        assert_eq!(summary.warnings[0].message, "GET /api/users/:id 404");
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_5xx_become_errors() {
        let text = "POST /api/orders 500 120ms\nPOST /api/orders 500 130ms\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].count, 2);
        assert_eq!(summary.statistics.error_count, 2);
    }

    #[test]
    fn test_combined_log_format() {
        let text = r#"127.0.0.1 - - [15/Jan/2024:10:30:00 +0000] "GET /health HTTP/1.1" 200 512"#;
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.endpoints.len(), 1);
        assert_eq!(summary.endpoints[0].endpoint, "GET /health");
    }

    #[test]
    fn test_key_value_format() {
        let text = "method=GET path=/api/items/9 status=200 duration=12ms\n";
        let summary = summarizer().summarize(text, &SummaryOptions::default());
        assert_eq!(summary.endpoints[0].endpoint, "GET /api/items/:id");
        assert!((summary.endpoints[0].avg_response_ms - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_uuid_path_normalization() {
        let s = summarizer();
        assert_eq!(
            s.normalize_path("/api/jobs/550e8400-e29b-41d4-a716-446655440000/logs"),
            "/api/jobs/:uuid/logs"
        );
        assert_eq!(
            s.normalize_path("/docs/507f1f77bcf86cd799439011"),
            "/docs/:id"
        );
        assert_eq!(s.normalize_path("/api/users?page=2"), "/api/users");
    }
}
