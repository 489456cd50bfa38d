// Structured error extraction from known tool-output shapes
use regex::{Captures, Regex};

/// Structured parts extracted from one error/log line
///
/// At most one `ErrorParts` is produced per line; absence means the line
/// matched no recognized shape and failed the fallback heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorParts {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub code: Option<String>,
    pub message: String,
    pub raw: String,
}

type Builder = fn(&Captures<'_>, &str) -> ErrorParts;

/// Fixed-priority cascade of tool-format patterns
///
/// Language-specific structured formats are tried before the generic
/// bracket/colon formats; first match wins. Each pattern is a pure
/// `(line) -> Option<ErrorParts>` step, kept in one ordered array so the
/// contract stays explicit and testable in isolation.
pub struct Extractor {
    patterns: Vec<(Regex, Builder)>,
    fallback_keywords: Regex,
    caret_line: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        let patterns: Vec<(Regex, Builder)> = vec![
            // TypeScript: src/a.ts(12,5): error TS2304: Cannot find name 'foo'.
            (
                Regex::new(
                    r"^(?P<file>[^\s():]+)\((?P<line>\d+),(?P<col>\d+)\):\s*(?:error|warning)\s+(?P<code>TS\d+):\s*(?P<msg>.+)$",
                )
                .unwrap(),
                build_located,
            ),
            // ESLint stylish: 12:5  error  Unexpected console statement  no-console
            (
                Regex::new(
                    r"^\s*(?P<line>\d+):(?P<col>\d+)\s+(?:error|warning)\s+(?P<msg>.+?)\s{2,}(?P<code>[@\w][\w/-]*)$",
                )
                .unwrap(),
                build_located,
            ),
            // GCC/Clang: main.c:10:5: error: expected ';' before 'return'
            (
                Regex::new(
                    r"^(?P<file>[^:\s]+):(?P<line>\d+):(?P<col>\d+):\s*(?:fatal\s+)?(?:error|warning|note):\s*(?P<msg>.+)$",
                )
                .unwrap(),
                build_located,
            ),
            // Python traceback frame: File "app.py", line 12, in main
            (
                Regex::new(r#"^\s*File\s+"(?P<file>[^"]+)",\s+line\s+(?P<line>\d+)"#).unwrap(),
                build_frame,
            ),
            // Python exception: ValueError: invalid literal for int()
            (
                Regex::new(
                    r"^(?P<code>[A-Za-z_][A-Za-z0-9_.]*(?:Error|Exception|Warning)):\s*(?P<msg>.+)$",
                )
                .unwrap(),
                build_located,
            ),
            // Go: main.go:12:3: undefined: foo
            (
                Regex::new(r"^(?P<file>\S+\.go):(?P<line>\d+)(?::(?P<col>\d+))?:\s*(?P<msg>.+)$")
                    .unwrap(),
                build_located,
            ),
            // Rust diagnostic: error[E0308]: mismatched types
            (
                Regex::new(r"^(?:error|warning)\[(?P<code>E\d{4})\]:\s*(?P<msg>.+)$").unwrap(),
                build_located,
            ),
            // Rust location:  --> src/main.rs:5:9
            (
                Regex::new(r"^\s*-->\s*(?P<file>[^:\s]+):(?P<line>\d+):(?P<col>\d+)").unwrap(),
                build_frame,
            ),
            // Generic bracketed: [ERROR] connection refused
            (
                Regex::new(r"^\[(?i:error|err|fatal|critical)\]\s*(?P<msg>.+)$").unwrap(),
                build_located,
            ),
            // Generic colon: ERROR: disk full
            (
                Regex::new(r"^(?i:error|fatal)\s*:\s*(?P<msg>.+)$").unwrap(),
                build_located,
            ),
        ];

        Self {
            patterns,
            fallback_keywords: Regex::new(
                r"(?i)\b(?:error|fail(?:ed|ure)?|exception|cannot|invalid|unexpected|missing|undefined|not found|type mismatch|syntax error)\b",
            )
            .unwrap(),
            caret_line: Regex::new(r"^\s*[\^~]+\s*$").unwrap(),
        }
    }

    /// Try each known tool format in priority order; first match wins.
    ///
    /// Lines matching no format fall through to a "looks like an error"
    /// keyword test producing a minimal `ErrorParts`, or `None`.
    pub fn extract(&self, line: &str) -> Option<ErrorParts> {
        if line.trim().is_empty() {
            return None;
        }

        for (regex, build) in &self.patterns {
            if let Some(caps) = regex.captures(line) {
                return Some(build(&caps, line));
            }
        }

        if self.fallback_keywords.is_match(line) || self.caret_line.is_match(line) {
            return Some(ErrorParts {
                file: None,
                line: None,
                column: None,
                code: None,
                message: line.trim().to_string(),
                raw: line.to_string(),
            });
        }

        None
    }
}

fn cap_str(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().to_string())
}

fn cap_u32(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Formats with an explicit message capture
fn build_located(caps: &Captures<'_>, raw: &str) -> ErrorParts {
    ErrorParts {
        file: cap_str(caps, "file"),
        line: cap_u32(caps, "line"),
        column: cap_u32(caps, "col"),
        code: cap_str(caps, "code"),
        message: cap_str(caps, "msg").unwrap_or_else(|| raw.trim().to_string()),
        raw: raw.to_string(),
    }
}

/// Location-only frames (tracebacks, rustc arrows) keep the whole line as message
fn build_frame(caps: &Captures<'_>, raw: &str) -> ErrorParts {
    ErrorParts {
        file: cap_str(caps, "file"),
        line: cap_u32(caps, "line"),
        column: cap_u32(caps, "col"),
        code: None,
        message: raw.trim().to_string(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new()
    }

    #[test]
    fn test_typescript_format() {
        let parts = extractor()
            .extract("src/a.ts(12,5): error TS2304: Cannot find name 'foo'.")
            .unwrap();
        assert_eq!(parts.file.as_deref(), Some("src/a.ts"));
        assert_eq!(parts.line, Some(12));
        assert_eq!(parts.column, Some(5));
        assert_eq!(parts.code.as_deref(), Some("TS2304"));
        assert_eq!(parts.message, "Cannot find name 'foo'.");
    }

    #[test]
    fn test_eslint_format() {
        let parts = extractor()
            .extract("  42:13  error  Unexpected console statement  no-console")
            .unwrap();
        assert_eq!(parts.line, Some(42));
        assert_eq!(parts.column, Some(13));
        assert_eq!(parts.code.as_deref(), Some("no-console"));
        assert_eq!(parts.message, "Unexpected console statement");
    }

    #[test]
    fn test_gcc_format() {
        let parts = extractor()
            .extract("main.c:10:5: error: expected ';' before 'return'")
            .unwrap();
        assert_eq!(parts.file.as_deref(), Some("main.c"));
        assert_eq!(parts.line, Some(10));
        assert_eq!(parts.message, "expected ';' before 'return'");
    }

    #[test]
    fn test_python_traceback_frame() {
        let parts = extractor()
            .extract("  File \"app.py\", line 12, in main")
            .unwrap();
        assert_eq!(parts.file.as_deref(), Some("app.py"));
        assert_eq!(parts.line, Some(12));
        assert!(parts.code.is_none());
    }

    #[test]
    fn test_python_exception() {
        let parts = extractor()
            .extract("ValueError: invalid literal for int() with base 10: 'x'")
            .unwrap();
        assert_eq!(parts.code.as_deref(), Some("ValueError"));
        assert!(parts.message.starts_with("invalid literal"));
    }

    #[test]
    fn test_go_format() {
        let parts = extractor().extract("main.go:12:3: undefined: foo").unwrap();
        assert_eq!(parts.file.as_deref(), Some("main.go"));
        assert_eq!(parts.line, Some(12));
        assert_eq!(parts.column, Some(3));
        assert_eq!(parts.message, "undefined: foo");
    }

    #[test]
    fn test_rust_diagnostic_and_location() {
        let e = extractor();
        let diag = e.extract("error[E0308]: mismatched types").unwrap();
        assert_eq!(diag.code.as_deref(), Some("E0308"));
        assert_eq!(diag.message, "mismatched types");

        let loc = e.extract("  --> src/main.rs:5:9").unwrap();
        assert_eq!(loc.file.as_deref(), Some("src/main.rs"));
        assert_eq!(loc.line, Some(5));
        assert_eq!(loc.column, Some(9));
    }

    #[test]
    fn test_generic_bracketed_and_colon() {
        let e = extractor();
        let b = e.extract("[ERROR] connection refused").unwrap();
        assert_eq!(b.message, "connection refused");

        let c = e.extract("ERROR: disk full").unwrap();
        assert_eq!(c.message, "disk full");
    }

    #[test]
    fn test_fallback_keyword_heuristic() {
        let parts = extractor()
            .extract("the deploy failed because the bucket was missing")
            .unwrap();
        assert!(parts.file.is_none());
        assert!(parts.code.is_none());
        assert_eq!(parts.message, "the deploy failed because the bucket was missing");
    }

    #[test]
    fn test_caret_underline_line() {
        assert!(extractor().extract("        ^^^^^^^").is_some());
    }

    #[test]
    fn test_unrecognized_line_is_none() {
        assert!(extractor().extract("everything is fine here").is_none());
        assert!(extractor().extract("").is_none());
        assert!(extractor().extract("   ").is_none());
    }

    #[test]
    fn test_first_match_wins_over_generic() {
        // A TS line also contains the word "error" but must extract as TS
        let parts = extractor()
            .extract("src/a.ts(1,1): error TS1005: ';' expected.")
            .unwrap();
        assert_eq!(parts.code.as_deref(), Some("TS1005"));
    }
}
