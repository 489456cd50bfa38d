// Placeholder normalization for error/log lines
use regex::Regex;

use super::ErrorParts;

/// Rewrites variable substrings to fixed placeholders so lines with the same
/// shape collapse to one signature.
///
/// Substitution order matters: paths and timestamps run before the generic
/// numeric rules to avoid double-mangling. Normalization is idempotent.
pub struct Normalizer {
    file_path: Regex,
    iso_timestamp: Regex,
    slash_timestamp: Regex,
    paren_loc: Regex,
    bracket_loc: Regex,
    line_col: Regex,
    line_word: Regex,
    double_quoted: Regex,
    single_quoted: Regex,
    backtick_quoted: Regex,
    hex_hash: Regex,
    long_int: Regex,
    whitespace: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            file_path: Regex::new(
                r"(?:[A-Za-z]:)?[\w~./\\-]*[\w-]\.(?:rs|ts|tsx|js|jsx|mjs|cjs|py|go|java|c|cc|cpp|h|hpp|rb|php|cs|swift|kt|scala|sh|json|toml|yaml|yml|lock|md)\b",
            )
            .unwrap(),
            iso_timestamp: Regex::new(
                r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?",
            )
            .unwrap(),
            slash_timestamp: Regex::new(r"\d{1,2}/\d{1,2}/\d{2,4}[ ,]\s*\d{1,2}:\d{2}(?::\d{2})?")
                .unwrap(),
            paren_loc: Regex::new(r"\(\d+,\s*\d+\)").unwrap(),
            bracket_loc: Regex::new(r"\[\d+,\s*\d+\]").unwrap(),
            line_col: Regex::new(r"\b\d+:\d+(?::\d+)?\b").unwrap(),
            line_word: Regex::new(r"(?i)\b(?:line|col(?:umn)?)\s+\d+\b").unwrap(),
            double_quoted: Regex::new(r#""[^"]*""#).unwrap(),
            single_quoted: Regex::new(r"'[^']*'").unwrap(),
            backtick_quoted: Regex::new(r"`[^`]*`").unwrap(),
            hex_hash: Regex::new(r"\b[0-9a-fA-F]{32,}\b").unwrap(),
            long_int: Regex::new(r"\b\d{5,}\b").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Rewrite variable substrings with fixed placeholders
    pub fn normalize(&self, line: &str) -> String {
        let s = self.file_path.replace_all(line, "<FILE>");
        let s = self.iso_timestamp.replace_all(&s, "<TIMESTAMP>");
        let s = self.slash_timestamp.replace_all(&s, "<TIMESTAMP>");
        let s = self.paren_loc.replace_all(&s, "<LINE>");
        let s = self.bracket_loc.replace_all(&s, "<LINE>");
        let s = self.line_col.replace_all(&s, "<LINE>");
        let s = self.line_word.replace_all(&s, "<LINE>");
        let s = self.double_quoted.replace_all(&s, "\"<VALUE>\"");
        let s = self.single_quoted.replace_all(&s, "'<VALUE>'");
        let s = self.backtick_quoted.replace_all(&s, "`<VALUE>`");
        let s = self.hex_hash.replace_all(&s, "<HASH>");
        let s = self.long_int.replace_all(&s, "<ID>");
        let s = self.whitespace.replace_all(&s, " ");
        s.trim().to_string()
    }

    /// Build the signature key for extracted error parts:
    /// `code? + ": " + normalize(message)`
    pub fn signature(&self, parts: &ErrorParts) -> String {
        let normalized = self.normalize(&parts.message);
        match &parts.code {
            Some(code) => format!("{}: {}", code, normalized),
            None => normalized,
        }
    }
}
