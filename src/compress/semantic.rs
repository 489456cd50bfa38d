// Ratio-driven reduction for long prose
use crate::compress::{passthrough, render_selection, select_by_budget, CompressionResult, CompressionStats};
use crate::error::{CondenseError, Result};
use crate::scoring::{segment_text, ScoreWeights, SegmentScorer};
use crate::tokens::estimate_tokens;

const TECHNIQUE: &str = "semantic-pruning";

/// Same scoring substrate as the generic strategy, but driven by an
/// explicit compression ratio instead of a detail level. Intended for long
/// prose without code fences; segmentation is sentence-granular there.
pub struct SemanticCompressor {
    scorer: SegmentScorer,
    min_tokens: usize,
    max_segments: usize,
}

impl SemanticCompressor {
    pub fn new(weights: ScoreWeights, min_tokens: usize, max_segments: usize) -> Result<Self> {
        Ok(Self {
            scorer: SegmentScorer::new(weights)?,
            min_tokens,
            max_segments,
        })
    }

    /// Remove roughly `ratio` of the input tokens
    ///
    /// `ratio` is the fraction to drop: 0.6 keeps about 40% of the input.
    /// Values outside (0, 1) are caller misuse and fail fast.
    pub fn compress(&self, text: &str, ratio: f32) -> Result<CompressionResult> {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(CondenseError::InvalidOptions(format!(
                "compression ratio must be in (0, 1), got {}",
                ratio
            )));
        }

        let original_tokens = estimate_tokens(text);
        if original_tokens <= self.min_tokens {
            return Ok(passthrough(text));
        }

        let segments = segment_text(text, self.max_segments);
        if segments.is_empty() {
            return Ok(passthrough(text));
        }

        let scored = self.scorer.score_all(segments);
        let budget = (original_tokens as f32 * (1.0 - ratio)).ceil() as usize;
        let keep = select_by_budget(&scored, budget);
        let compressed = render_selection(&scored, &keep);
        let compressed_tokens = estimate_tokens(&compressed);

        Ok(CompressionResult {
            compressed,
            stats: CompressionStats::new(original_tokens, compressed_tokens, TECHNIQUE),
        })
    }
}
