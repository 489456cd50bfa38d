//! Content type detection over sampled input lines
//!
//! Classifies raw text into a small closed set of categories using weighted
//! pattern indicators. Indicator density is sampled over the first N
//! non-blank lines rather than the whole document, which bounds cost on very
//! large inputs and makes the verdict stable under trailing noise.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Closed set of content categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Logs,
    Stacktrace,
    Code,
    Generic,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentType::Logs => "logs",
            ContentType::Stacktrace => "stacktrace",
            ContentType::Code => "code",
            ContentType::Generic => "generic",
        };
        f.write_str(s)
    }
}

/// Heuristic content type detector with pre-compiled indicators
pub struct Detector {
    sample_lines: usize,
    trace_header: Regex,
    stack_frame: Regex,
    level_tag: Regex,
    timestamp: Regex,
    code_line: Regex,
}

impl Detector {
    /// Create a detector sampling at most `sample_lines` non-blank lines
    pub fn new(sample_lines: usize) -> Self {
        Self {
            sample_lines: sample_lines.max(1),
            trace_header: Regex::new(
                r#"^(?:Traceback \(most recent call last\)|thread '[^']*' panicked|Exception in thread|Unhandled exception|panicked at )"#,
            )
            .unwrap(),
            stack_frame: Regex::new(
                r#"^\s+(?:at .+\(.*\)\s*$|at [\w$./<>\[\]-]+:\d+|File "[^"]+", line \d+|\d+: \S+|[\w./-]+\.go:\d+)"#,
            )
            .unwrap(),
            level_tag: Regex::new(
                r"\[(?i:error|warn|warning|info|debug|trace|fatal)\]|(?:^|\s)(?:ERROR|WARN|WARNING|INFO|DEBUG|TRACE|FATAL)[:\s]|\blevel=(?i:error|warn|warning|info|debug|trace)",
            )
            .unwrap(),
            timestamp: Regex::new(
                r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}|\d{1,2}/\d{1,2}/\d{2,4}[ ,]\s*\d{1,2}:\d{2}",
            )
            .unwrap(),
            code_line: Regex::new(
                r"^\s*(?:(?:pub\s+)?(?:async\s+)?fn\s|def\s|class\s|impl\s|(?:export\s+)?(?:function|const|let|var)\s|import\s|use\s+\w|#include|package\s|interface\s|struct\s|enum\s)|[{};]\s*$|^\s*```",
            )
            .unwrap(),
        }
    }

    /// Classify text into one of the content categories
    ///
    /// Priority on ties: stacktrace > logs > code; generic when no indicator
    /// clears its threshold. Trailing blank lines never change the verdict
    /// because only non-blank lines are sampled.
    pub fn detect(&self, text: &str) -> ContentType {
        let sample: Vec<&str> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(self.sample_lines)
            .collect();

        if sample.is_empty() {
            return ContentType::Generic;
        }

        let mut stack_score = 0.0f32;
        let mut log_score = 0.0f32;
        let mut code_score = 0.0f32;

        for line in &sample {
            if self.trace_header.is_match(line) {
                stack_score += 2.0;
            }
            if self.stack_frame.is_match(line) {
                stack_score += 1.0;
            }
            if self.level_tag.is_match(line) {
                log_score += 1.0;
            }
            if self.timestamp.is_match(line) {
                log_score += 0.5;
            }
            if self.code_line.is_match(line) {
                code_score += 1.0;
            }
        }

        let n = sample.len() as f32;
        if stack_score >= 2.0 {
            ContentType::Stacktrace
        } else if log_score / n >= 0.25 {
            ContentType::Logs
        } else if code_score / n >= 0.3 {
            ContentType::Code
        } else {
            ContentType::Generic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> Detector {
        Detector::new(100)
    }

    #[test]
    fn test_detects_logs() {
        let text = "2024-01-15T10:30:00 [INFO] server started\n\
                    2024-01-15T10:30:01 [ERROR] connection refused\n\
                    2024-01-15T10:30:02 [INFO] retrying\n";
        assert_eq!(detector().detect(text), ContentType::Logs);
    }

    #[test]
    fn test_detects_js_stacktrace() {
        let text = "TypeError: Cannot read property 'foo' of undefined\n    \
                    at Object.handler (/app/src/index.js:42:13)\n    \
                    at Router.dispatch (/app/node_modules/express/lib/router.js:10:5)\n";
        assert_eq!(detector().detect(text), ContentType::Stacktrace);
    }

    #[test]
    fn test_detects_python_traceback() {
        let text = "Traceback (most recent call last):\n  \
                    File \"app.py\", line 12, in main\n    \
                    run()\nValueError: bad input\n";
        assert_eq!(detector().detect(text), ContentType::Stacktrace);
    }

    #[test]
    fn test_stacktrace_outranks_logs() {
        // Log lines embedding a stack trace still classify as stacktrace
        let text = "[ERROR] request failed\n    \
                    at handle (/srv/app.js:1:1)\n    \
                    at run (/srv/app.js:2:2)\n\
                    [ERROR] request failed\n";
        assert_eq!(detector().detect(text), ContentType::Stacktrace);
    }

    #[test]
    fn test_detects_code() {
        let text = "use std::collections::HashMap;\n\n\
                    pub fn insert(map: &mut HashMap<String, u32>, key: &str) {\n    \
                    map.insert(key.to_string(), 1);\n}\n";
        assert_eq!(detector().detect(text), ContentType::Code);
    }

    #[test]
    fn test_plain_prose_is_generic() {
        let text = "The quick brown fox jumps over the lazy dog. \
                    It was the best of times, it was the worst of times.\n\
                    Nothing here resembles tool output at all.\n";
        assert_eq!(detector().detect(text), ContentType::Generic);
    }

    #[test]
    fn test_stable_under_trailing_blank_lines() {
        let base = "2024-01-15T10:30:00 [INFO] started\n\
                    2024-01-15T10:30:01 [ERROR] failed\n";
        let noisy = format!("{}\n\n   \n\t\n\n", base);
        assert_eq!(detector().detect(base), detector().detect(&noisy));
    }

    #[test]
    fn test_empty_input_is_generic() {
        assert_eq!(detector().detect(""), ContentType::Generic);
    }
}
