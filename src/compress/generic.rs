// Generic importance-based reduction
use crate::compress::{passthrough, render_selection, select_by_budget, CompressionResult, CompressionStats};
use crate::error::Result;
use crate::scoring::{segment_text, ScoreWeights, SegmentScorer};
use crate::tokens::estimate_tokens;

const TECHNIQUE: &str = "importance-filtering";

/// Keeps the highest-importance segments within a detail-driven token
/// budget, re-emitted in original document order to preserve readability
pub struct GenericCompressor {
    scorer: SegmentScorer,
    min_tokens: usize,
    max_segments: usize,
}

impl GenericCompressor {
    pub fn new(weights: ScoreWeights, min_tokens: usize, max_segments: usize) -> Result<Self> {
        Ok(Self {
            scorer: SegmentScorer::new(weights)?,
            min_tokens,
            max_segments,
        })
    }

    /// Compress to roughly `budget_ratio` of the original token count
    ///
    /// Inputs at or below the minimum token threshold are returned
    /// unchanged with `technique = "none"`.
    pub fn compress(&self, text: &str, budget_ratio: f32) -> CompressionResult {
        let original_tokens = estimate_tokens(text);
        if original_tokens <= self.min_tokens {
            return passthrough(text);
        }

        let segments = segment_text(text, self.max_segments);
        if segments.is_empty() {
            return passthrough(text);
        }

        let scored = self.scorer.score_all(segments);
        let budget = (original_tokens as f32 * budget_ratio.clamp(0.05, 1.0)).ceil() as usize;
        let keep = select_by_budget(&scored, budget);
        let compressed = render_selection(&scored, &keep);
        let compressed_tokens = estimate_tokens(&compressed);

        CompressionResult {
            compressed,
            stats: CompressionStats::new(original_tokens, compressed_tokens, TECHNIQUE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressor() -> GenericCompressor {
        GenericCompressor::new(ScoreWeights::default(), 50, 4096).unwrap()
    }

    fn long_input() -> String {
        let mut text = String::from("ERROR: build failed while linking the final artifact\n\n");
        for i in 0..40 {
            text.push_str(&format!(
                "informational line {} with routine progress output that matters less\n\n",
                i
            ));
        }
        text.push_str("the very last line often carries the conclusion\n");
        text
    }

    #[test]
    fn test_small_input_passes_through() {
        let result = compressor().compress("tiny input", 0.4);
        assert_eq!(result.compressed, "tiny input");
        assert_eq!(result.stats.technique, "none");
        assert_eq!(result.stats.reduction_percent, 0.0);
    }

    #[test]
    fn test_reduces_long_input() {
        let text = long_input();
        let result = compressor().compress(&text, 0.4);
        assert_eq!(result.stats.technique, "importance-filtering");
        assert!(result.stats.compressed_tokens <= result.stats.original_tokens);
        assert!(result.stats.reduction_percent > 0.0);
    }

    #[test]
    fn test_keeps_error_line() {
        let text = long_input();
        let result = compressor().compress(&text, 0.3);
        assert!(result.compressed.contains("ERROR: build failed"));
    }

    #[test]
    fn test_output_preserves_document_order() {
        let text = long_input();
        let result = compressor().compress(&text, 0.5);
        let first = result.compressed.find("ERROR: build failed").unwrap();
        if let Some(last) = result.compressed.find("the very last line") {
            assert!(first < last);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = long_input();
        let a = compressor().compress(&text, 0.4);
        let b = compressor().compress(&text, 0.4);
        assert_eq!(a.compressed, b.compressed);
    }

    #[test]
    fn test_never_panics_on_garbage() {
        let garbage = "\u{0}\u{1}```unterminated\n\n\n   \t";
        let result = compressor().compress(garbage, 0.4);
        assert!(result.stats.reduction_percent <= 100.0);
    }
}
