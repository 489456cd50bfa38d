// Diff-aware reduction: keep structure and changes, collapse context
use crate::compress::{passthrough, CompressionResult, CompressionStats};
use crate::tokens::estimate_tokens;

const TECHNIQUE: &str = "diff-context-collapse";

/// Quick structural probe for unified-diff/patch input
pub fn is_diff(text: &str) -> bool {
    let mut has_old = false;
    let mut has_new = false;
    for line in text.lines().take(200) {
        if line.starts_with("diff --git") || line.starts_with("@@") {
            return true;
        }
        if line.starts_with("--- ") {
            has_old = true;
        }
        if line.starts_with("+++ ") {
            has_new = true;
        }
        if has_old && has_new {
            return true;
        }
    }
    false
}

/// Preserves hunk headers and changed lines; unchanged context beyond a
/// small margin collapses to an elision marker
pub struct DiffCompressor {
    context_margin: usize,
}

impl DiffCompressor {
    pub fn new(context_margin: usize) -> Self {
        Self { context_margin }
    }

    pub fn compress(&self, text: &str) -> CompressionResult {
        if !is_diff(text) {
            return passthrough(text);
        }

        let original_tokens = estimate_tokens(text);
        let mut out: Vec<String> = Vec::new();
        let mut context_run: Vec<&str> = Vec::new();

        for line in text.lines() {
            if is_structural(line) || is_change(line) {
                self.flush_context(&mut out, &mut context_run);
                out.push(line.to_string());
            } else {
                context_run.push(line);
            }
        }
        self.flush_context(&mut out, &mut context_run);

        let compressed = out.join("\n");
        let compressed_tokens = estimate_tokens(&compressed);

        CompressionResult {
            compressed,
            stats: CompressionStats::new(original_tokens, compressed_tokens, TECHNIQUE),
        }
    }

    /// Keep the leading and trailing margin of a context run, collapse the
    /// middle into one marker line
    fn flush_context(&self, out: &mut Vec<String>, run: &mut Vec<&str>) {
        let margin = self.context_margin;
        if run.len() <= margin * 2 + 1 {
            out.extend(run.iter().map(|l| l.to_string()));
        } else {
            out.extend(run[..margin].iter().map(|l| l.to_string()));
            out.push(format!("… {} unchanged lines", run.len() - margin * 2));
            out.extend(run[run.len() - margin..].iter().map(|l| l.to_string()));
        }
        run.clear();
    }
}

fn is_structural(line: &str) -> bool {
    line.starts_with("diff --git")
        || line.starts_with("index ")
        || line.starts_with("--- ")
        || line.starts_with("+++ ")
        || line.starts_with("@@")
        || line.starts_with("\\ No newline")
}

fn is_change(line: &str) -> bool {
    (line.starts_with('+') && !line.starts_with("+++"))
        || (line.starts_with('-') && !line.starts_with("---"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_diff() -> String {
        let mut text = String::from(
            "diff --git a/src/app.rs b/src/app.rs\n\
             index 1111111..2222222 100644\n\
             --- a/src/app.rs\n\
             +++ b/src/app.rs\n\
             @@ -1,30 +1,30 @@\n",
        );
        for i in 0..12 {
            text.push_str(&format!(" context line {}\n", i));
        }
        text.push_str("-    let old = 1;\n");
        text.push_str("+    let new = 2;\n");
        for i in 12..24 {
            text.push_str(&format!(" context line {}\n", i));
        }
        text
    }

    #[test]
    fn test_is_diff() {
        assert!(is_diff(&sample_diff()));
        assert!(!is_diff("just some prose\nwith two lines"));
    }

    #[test]
    fn test_preserves_headers_and_changes() {
        let result = DiffCompressor::new(2).compress(&sample_diff());
        assert!(result.compressed.contains("@@ -1,30 +1,30 @@"));
        assert!(result.compressed.contains("-    let old = 1;"));
        assert!(result.compressed.contains("+    let new = 2;"));
        assert_eq!(result.stats.technique, "diff-context-collapse");
    }

    #[test]
    fn test_collapses_context_runs() {
        let result = DiffCompressor::new(2).compress(&sample_diff());
        assert!(result.compressed.contains("unchanged lines"));
        assert!(!result.compressed.contains("context line 5"));
        assert!(result.stats.compressed_tokens < result.stats.original_tokens);
    }

    #[test]
    fn test_non_diff_passes_through() {
        let result = DiffCompressor::new(2).compress("plain text, not a diff");
        assert_eq!(result.stats.technique, "none");
        assert_eq!(result.compressed, "plain text, not a diff");
    }

    #[test]
    fn test_short_context_kept_verbatim() {
        let text = "--- a/x\n+++ b/x\n@@ -1,3 +1,3 @@\n ctx one\n-old\n+new\n ctx two\n";
        let result = DiffCompressor::new(2).compress(text);
        assert!(result.compressed.contains("ctx one"));
        assert!(result.compressed.contains("ctx two"));
        assert!(!result.compressed.contains("unchanged lines"));
    }
}
