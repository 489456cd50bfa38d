//! Compression strategies built on the segment scorer
//!
//! All strategies share a failure policy: never error on malformed or
//! partial input. Worst case they hand back the original content with
//! `technique = "none"` and a reduction at or near zero. Pathological tiny
//! inputs may expand after structural annotation; callers must tolerate
//! `reduction_percent <= 0`.

mod diff;
mod generic;
mod multi_file;
mod semantic;

pub use diff::{is_diff, DiffCompressor};
pub use generic::GenericCompressor;
pub use multi_file::{
    Chunk, FileContext, MultiFileCompressor, MultiFileResult, MultiFileStats, MultiFileStrategy,
    Outline, OutlineProvider, RegexOutline, SharedElements,
};
pub use semantic::SemanticCompressor;

use serde::{Deserialize, Serialize};

use crate::error::CondenseError;
use crate::scoring::ScoredSegment;
use crate::tokens::estimate_tokens;

/// Three-tier verbosity knob controlling output length caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    Minimal,
    Normal,
    Detailed,
}

impl Default for Detail {
    fn default() -> Self {
        Detail::Normal
    }
}

impl std::str::FromStr for Detail {
    type Err = CondenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal" => Ok(Detail::Minimal),
            "normal" => Ok(Detail::Normal),
            "detailed" => Ok(Detail::Detailed),
            other => Err(CondenseError::InvalidOptions(format!(
                "unknown detail level '{}' (expected minimal|normal|detailed)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Detail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Detail::Minimal => "minimal",
            Detail::Normal => "normal",
            Detail::Detailed => "detailed",
        };
        f.write_str(s)
    }
}

/// Before/after accounting for one compression call
#[derive(Debug, Clone, Serialize)]
pub struct CompressionStats {
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    pub reduction_percent: f32,
    pub technique: String,
}

impl CompressionStats {
    pub fn new(original_tokens: usize, compressed_tokens: usize, technique: &str) -> Self {
        let reduction_percent = if original_tokens > 0 {
            (1.0 - compressed_tokens as f32 / original_tokens as f32) * 100.0
        } else {
            0.0
        };
        Self {
            original_tokens,
            compressed_tokens,
            reduction_percent,
            technique: technique.to_string(),
        }
    }
}

/// Terminal output of one compression call
#[derive(Debug, Clone, Serialize)]
pub struct CompressionResult {
    pub compressed: String,
    pub stats: CompressionStats,
}

/// Hand the input back unchanged
pub(crate) fn passthrough(text: &str) -> CompressionResult {
    let tokens = estimate_tokens(text);
    CompressionResult {
        compressed: text.to_string(),
        stats: CompressionStats::new(tokens, tokens, "none"),
    }
}

/// Mark the highest-importance segments to keep within a token budget
///
/// Preserved segments are always kept. Ties in importance resolve by
/// document order (earlier segment wins) so selection is deterministic.
pub(crate) fn select_by_budget(scored: &[ScoredSegment], budget_tokens: usize) -> Vec<bool> {
    let mut keep = vec![false; scored.len()];
    let mut used = 0usize;

    for (i, s) in scored.iter().enumerate() {
        if s.segment.preserved {
            keep[i] = true;
            used += s.segment.tokens;
        }
    }

    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&a, &b| {
        scored[b]
            .importance
            .partial_cmp(&scored[a].importance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    for &i in &order {
        if keep[i] {
            continue;
        }
        if used >= budget_tokens {
            break;
        }
        keep[i] = true;
        used += scored[i].segment.tokens;
    }

    // Keep at least the single best segment rather than emitting nothing
    if !keep.iter().any(|&k| k) {
        if let Some(&best) = order.first() {
            keep[best] = true;
        }
    }

    keep
}

/// Re-emit kept segments in original document order, marking gaps
pub(crate) fn render_selection(scored: &[ScoredSegment], keep: &[bool]) -> String {
    let mut out = String::new();
    let mut last_kept: Option<usize> = None;
    for (i, s) in scored.iter().enumerate() {
        if !keep[i] {
            continue;
        }
        if let Some(prev) = last_kept {
            if i > prev + 1 {
                out.push_str("…\n");
            }
        }
        out.push_str(&s.segment.text);
        out.push('\n');
        last_kept = Some(i);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_parsing() {
        assert_eq!("minimal".parse::<Detail>().unwrap(), Detail::Minimal);
        assert_eq!("DETAILED".parse::<Detail>().unwrap(), Detail::Detailed);
        assert!("verbose".parse::<Detail>().is_err());
    }

    #[test]
    fn test_stats_reduction() {
        let stats = CompressionStats::new(100, 25, "importance-filtering");
        assert!((stats.reduction_percent - 75.0).abs() < 0.01);

        let none = CompressionStats::new(0, 0, "none");
        assert_eq!(none.reduction_percent, 0.0);
    }

    #[test]
    fn test_expansion_reports_negative_reduction() {
        let stats = CompressionStats::new(10, 12, "none");
        assert!(stats.reduction_percent < 0.0);
    }
}
