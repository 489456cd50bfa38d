// Signature-keyed grouping with duplicate counts
use ahash::{HashMap, HashMapExt};

use super::{Extractor, Normalizer};
use crate::tokens::estimate_tokens;

/// One bucket of lines sharing a normalized signature
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignatureGroup {
    pub signature: String,
    /// First-seen raw line for this signature
    pub representative: String,
    pub count: usize,
    pub members: Vec<String>,
}

/// Result of grouping one input text
#[derive(Debug, Clone)]
pub struct GroupedErrors {
    /// Groups in first-seen order of their signature
    pub groups: Vec<SignatureGroup>,
    /// Non-blank input lines scanned
    pub input_lines: usize,
    /// Lines that produced a recognized or fallback error match;
    /// equals the sum of all group counts
    pub matched_lines: usize,
}

/// Aggregate statistics for a grouping run
#[derive(Debug, Clone, serde::Serialize)]
pub struct GroupStats {
    pub original_lines: usize,
    pub unique_errors: usize,
    /// Duplicates among recognized lines: matched - unique
    pub total_duplicates: usize,
    /// Token-based reduction of the rendered groups vs the raw input
    pub reduction_percent: f32,
}

/// Buckets error lines by normalized signature
///
/// Output ordering is insertion order of first occurrence, not frequency,
/// so results stay stable and diffable across repeated runs.
pub struct SignatureGrouper {
    extractor: Extractor,
    normalizer: Normalizer,
}

impl Default for SignatureGrouper {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureGrouper {
    pub fn new() -> Self {
        Self {
            extractor: Extractor::new(),
            normalizer: Normalizer::new(),
        }
    }

    /// Group every matching line of `text` by signature
    pub fn group(&self, text: &str) -> GroupedErrors {
        let mut groups: Vec<SignatureGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut input_lines = 0;
        let mut matched_lines = 0;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            input_lines += 1;

            let Some(parts) = self.extractor.extract(line) else {
                continue;
            };
            matched_lines += 1;

            let signature = self.normalizer.signature(&parts);
            match index.get(&signature) {
                Some(&i) => {
                    groups[i].count += 1;
                    groups[i].members.push(line.to_string());
                }
                None => {
                    index.insert(signature.clone(), groups.len());
                    groups.push(SignatureGroup {
                        signature,
                        representative: line.trim().to_string(),
                        count: 1,
                        members: vec![line.to_string()],
                    });
                }
            }
        }

        GroupedErrors {
            groups,
            input_lines,
            matched_lines,
        }
    }

    /// Render groups as representative lines with duplicate counts
    pub fn format_groups(grouped: &GroupedErrors) -> String {
        let mut out = String::new();
        for group in &grouped.groups {
            out.push_str(&group.representative);
            if group.count > 1 {
                out.push_str(&format!(" (×{})", group.count));
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    /// Compute grouping statistics against the raw input
    ///
    /// Reduction is measured on token estimates of the rendered groups vs
    /// the raw input, not on line counts.
    pub fn stats(grouped: &GroupedErrors, raw: &str) -> GroupStats {
        let rendered = Self::format_groups(grouped);
        let original_tokens = estimate_tokens(raw);
        let rendered_tokens = estimate_tokens(&rendered);
        let reduction_percent = if original_tokens > 0 {
            (1.0 - rendered_tokens as f32 / original_tokens as f32) * 100.0
        } else {
            0.0
        };

        GroupStats {
            original_lines: grouped.input_lines,
            unique_errors: grouped.groups.len(),
            total_duplicates: grouped.matched_lines - grouped.groups.len(),
            reduction_percent,
        }
    }
}
