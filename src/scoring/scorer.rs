// Importance scoring over segments
use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CondenseError, Result};
use crate::scoring::Segment;

/// Weights for the three score components; must sum to 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub tfidf: f32,
    pub position: f32,
    pub keyword: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            tfidf: 0.4,
            position: 0.3,
            keyword: 0.3,
        }
    }
}

impl ScoreWeights {
    /// Fail fast on caller misuse: this is a programming error, not a data
    /// problem.
    pub fn validate(&self) -> Result<()> {
        let components = [
            ("tfidf", self.tfidf),
            ("position", self.position),
            ("keyword", self.keyword),
        ];
        for (name, value) in components {
            if !(0.0..=1.0).contains(&value) {
                return Err(CondenseError::InvalidOptions(format!(
                    "score weight '{}' must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        let sum = self.tfidf + self.position + self.keyword;
        if (sum - 1.0).abs() > 1e-3 {
            return Err(CondenseError::InvalidOptions(format!(
                "score weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}

/// Breakdown of the normalized components behind one importance score
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub tfidf: f32,
    pub position: f32,
    pub keyword: f32,
    pub combined: f32,
}

/// A segment with its importance score; never mutated after scoring
#[derive(Debug, Clone)]
pub struct ScoredSegment {
    pub segment: Segment,
    /// Weighted combination of the components, in [0, 1]
    pub importance: f32,
    pub scores: ScoreBreakdown,
}

/// U-shaped position curve favoring document start and end
pub fn position_weight(p: f32) -> f32 {
    if !(0.0..=1.0).contains(&p) {
        return 0.6;
    }
    if p <= 0.1 || p >= 0.9 {
        1.0
    } else if p <= 0.2 || p >= 0.8 {
        0.85
    } else if p <= 0.3 || p >= 0.7 {
        0.7
    } else {
        0.6
    }
}

/// Scores segments by rarity, position, and keyword salience
///
/// Stateless across calls; output ordering follows input ordering so
/// results are reproducible (no hash-map iteration order leaks through).
pub struct SegmentScorer {
    weights: ScoreWeights,
    error_words: Regex,
    instruction_words: Regex,
    inline_code: Regex,
    structure: Regex,
    prog_keywords: Regex,
    reference: Regex,
}

impl SegmentScorer {
    pub fn new(weights: ScoreWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            weights,
            error_words: Regex::new(
                r"(?i)\b(?:error|fail(?:ed|ure)?|exception|panic(?:ked)?|fatal|crash(?:ed)?)\b",
            )
            .unwrap(),
            instruction_words: Regex::new(
                r"(?i)\b(?:must|should|required|important|note|warning|todo)\b",
            )
            .unwrap(),
            inline_code: Regex::new(r"`[^`]+`|```").unwrap(),
            structure: Regex::new(r"(?m)^\s*(?:#{1,6}\s|[-*+]\s|\d+\.\s|>\s)").unwrap(),
            prog_keywords: Regex::new(
                r"\b(?:fn|def|class|impl|struct|enum|interface|import|return|async|await|const|let|var|pub|function)\b",
            )
            .unwrap(),
            reference: Regex::new(r"https?://\S+|@\w+|#\w+").unwrap(),
        })
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Score every segment against the whole set
    ///
    /// Two passes: document frequencies first, then one score per segment.
    pub fn score_all(&self, segments: Vec<Segment>) -> Vec<ScoredSegment> {
        let word_sets: Vec<BTreeSet<String>> =
            segments.iter().map(|s| segment_words(&s.text)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for set in &word_sets {
            for word in set {
                *document_frequency.entry(word.as_str()).or_insert(0) += 1;
            }
        }
        let n = segments.len() as f32;

        segments
            .into_iter()
            .zip(word_sets.iter())
            .map(|(segment, words)| {
                let tfidf = rarity(words, &document_frequency, n);
                let position = position_weight(segment.position);
                let keyword = self.keyword_boost(&segment.text);
                let combined = (self.weights.tfidf * tfidf
                    + self.weights.position * position
                    + self.weights.keyword * keyword)
                    .clamp(0.0, 1.0);

                ScoredSegment {
                    segment,
                    importance: combined,
                    scores: ScoreBreakdown {
                        tfidf,
                        position,
                        keyword,
                        combined,
                    },
                }
            })
            .collect()
    }

    /// Additive keyword salience, capped at 1.0 only after summing
    pub fn keyword_boost(&self, text: &str) -> f32 {
        let mut boost: f32 = 0.0;
        if self.error_words.is_match(text) {
            boost += 0.4;
        }
        if self.instruction_words.is_match(text) {
            boost += 0.3;
        }
        if self.inline_code.is_match(text) {
            boost += 0.2;
        }
        if self.structure.is_match(text) {
            boost += 0.15;
        }
        if self.prog_keywords.is_match(text) {
            boost += 0.1;
        }
        if text.trim_end().ends_with('?') {
            boost += 0.15;
        }
        if self.reference.is_match(text) {
            boost += 0.1;
        }
        boost.min(1.0)
    }
}

/// Lowercased word set of a segment; a BTreeSet keeps downstream float
/// summation order-stable
fn segment_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// TF-IDF-style rarity of a segment's vocabulary, normalized to [0, 1]
fn rarity(words: &BTreeSet<String>, document_frequency: &HashMap<&str, usize>, n: f32) -> f32 {
    if words.is_empty() || n <= 1.0 {
        return 0.5;
    }
    let ln_n = n.ln();
    if ln_n <= 0.0 {
        return 0.5;
    }
    let sum: f32 = words
        .iter()
        .map(|w| {
            let df = *document_frequency.get(w.as_str()).unwrap_or(&1) as f32;
            (n / df).ln() / ln_n
        })
        .sum();
    (sum / words.len() as f32).clamp(0.0, 1.0)
}
