//! Optimization orchestration: detect, dispatch, execute, report
//!
//! One `Optimizer` compiles every component up front; each `optimize` call
//! is pure with respect to its inputs and retains no state, so callers may
//! share one instance across threads without locking.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compress::{is_diff, Detail, DiffCompressor, GenericCompressor};
use crate::config::EngineConfig;
use crate::detect::{ContentType, Detector};
use crate::error::{CondenseError, Result};
use crate::signature::SignatureGrouper;
use crate::summarize::{SummarizerSet, SummaryOptions};
use crate::tokens::{HeuristicCounter, TokenCounter};

/// Caller-supplied routing hint; `auto` runs detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentHint {
    Auto,
    Build,
    Logs,
    Errors,
    Code,
}

impl std::str::FromStr for ContentHint {
    type Err = CondenseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "build" => Ok(Self::Build),
            "logs" => Ok(Self::Logs),
            "errors" => Ok(Self::Errors),
            "code" => Ok(Self::Code),
            other => Err(CondenseError::InvalidOptions(format!(
                "unknown hint '{}' (expected auto|build|logs|errors|code)",
                other
            ))),
        }
    }
}

/// Options for one optimize call
#[derive(Debug, Clone, Copy)]
pub struct OptimizeOptions {
    pub hint: ContentHint,
    pub detail: Detail,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            hint: ContentHint::Auto,
            detail: Detail::Normal,
        }
    }
}

/// Uniform result of one optimize call
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeOutcome {
    pub output: String,
    pub detected_type: ContentType,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
    pub savings_percent: f32,
    pub method: String,
    pub note: Option<String>,
}

/// Caller-owned accumulator for running totals across calls
///
/// The engine itself never keeps session state; callers that want running
/// token savings thread one of these through their own call sites.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SavingsLedger {
    pub calls: usize,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
}

impl SavingsLedger {
    pub fn record(&mut self, outcome: &OptimizeOutcome) {
        self.calls += 1;
        self.original_tokens += outcome.original_tokens;
        self.optimized_tokens += outcome.optimized_tokens;
    }

    pub fn tokens_saved(&self) -> usize {
        self.original_tokens.saturating_sub(self.optimized_tokens)
    }

    pub fn savings_percent(&self) -> f32 {
        if self.original_tokens == 0 {
            0.0
        } else {
            (1.0 - self.optimized_tokens as f32 / self.original_tokens as f32) * 100.0
        }
    }
}

enum Route {
    Build,
    Logs,
    Errors,
    Compress,
}

/// The optimization orchestrator
pub struct Optimizer {
    config: EngineConfig,
    counter: Box<dyn TokenCounter>,
    detector: Detector,
    grouper: SignatureGrouper,
    summarizers: SummarizerSet,
    generic: GenericCompressor,
    diff: DiffCompressor,
    build_marker: Regex,
}

impl Optimizer {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_counter(config, Box::new(HeuristicCounter))
    }

    /// Substitute a tokenizer-accurate counting backend
    pub fn with_counter(config: EngineConfig, counter: Box<dyn TokenCounter>) -> Result<Self> {
        config.validate()?;
        let generic = GenericCompressor::new(
            config.scoring.weights(),
            config.compression.min_compress_tokens,
            config.compression.max_segments,
        )?;

        Ok(Self {
            detector: Detector::new(config.detection.sample_lines),
            grouper: SignatureGrouper::new(),
            summarizers: SummarizerSet::new(config.summary.clone()),
            diff: DiffCompressor::new(config.compression.diff_context_margin),
            generic,
            counter,
            build_marker: Regex::new(
                r"error TS\d+|error\[E\d+\]|^ERROR in |^WARNING in |(?i)\b(?:webpack|vite|esbuild|rollup|tsc)\b",
            )
            .unwrap(),
            config,
        })
    }

    /// Optimize one input: detect, dispatch, execute, report
    pub fn optimize(&self, content: &str, options: &OptimizeOptions) -> Result<OptimizeOutcome> {
        let original_tokens = self.counter.count(content);

        // Tiny inputs cost more to compress than they save
        if content.chars().count() < self.config.compression.min_optimize_chars {
            tracing::debug!(
                chars = content.chars().count(),
                "input below optimization threshold"
            );
            return Ok(OptimizeOutcome {
                output: content.to_string(),
                detected_type: self.detector.detect(content),
                original_tokens,
                optimized_tokens: original_tokens,
                savings_percent: 0.0,
                method: "none".to_string(),
                note: Some("below optimization threshold; returned unchanged".to_string()),
            });
        }

        let (route, detected_type) = self.dispatch(content, options.hint);
        tracing::debug!(%detected_type, "dispatching");

        let summary_options = SummaryOptions {
            detail: options.detail,
        };

        let (output, method) = match route {
            Route::Build => {
                let summarizer = self
                    .summarizers
                    .by_name("build")
                    .unwrap_or_else(|| self.summarizers.select(content));
                let summary = summarizer.summarize(content, &summary_options);
                (summary.render(), format!("{}-log-summary", summary.summarizer))
            }
            Route::Logs => {
                let summary = self.summarizers.summarize(content, &summary_options);
                (summary.render(), format!("{}-log-summary", summary.summarizer))
            }
            Route::Errors => {
                let grouped = self.grouper.group(content);
                let stats = SignatureGrouper::stats(&grouped, content);
                let mut rendered = SignatureGrouper::format_groups(&grouped);
                if grouped.matched_lines == 0 {
                    // Nothing recognizable; degrade to importance filtering
                    let result = self
                        .generic
                        .compress(content, self.config.compression.budget_ratio(options.detail));
                    (result.compressed, result.stats.technique)
                } else {
                    rendered.push_str(&format!(
                        "\n\n{} unique errors, {} duplicates collapsed",
                        stats.unique_errors, stats.total_duplicates
                    ));
                    (rendered, "signature-grouping".to_string())
                }
            }
            Route::Compress => {
                let result = if is_diff(content) {
                    self.diff.compress(content)
                } else {
                    self.generic
                        .compress(content, self.config.compression.budget_ratio(options.detail))
                };
                (result.compressed, result.stats.technique)
            }
        };

        let optimized_tokens = self.counter.count(&output);
        let savings_percent = if original_tokens > 0 {
            (1.0 - optimized_tokens as f32 / original_tokens as f32) * 100.0
        } else {
            0.0
        };

        Ok(OptimizeOutcome {
            output,
            detected_type,
            original_tokens,
            optimized_tokens,
            savings_percent,
            method,
            note: None,
        })
    }

    /// Hint overrides detection; `auto` tries the build heuristic first
    /// because build failures are common and rarely match generic log
    /// signatures
    fn dispatch(&self, content: &str, hint: ContentHint) -> (Route, ContentType) {
        match hint {
            ContentHint::Build => (Route::Build, ContentType::Logs),
            ContentHint::Logs => (Route::Logs, ContentType::Logs),
            ContentHint::Errors => (Route::Errors, ContentType::Stacktrace),
            ContentHint::Code => (Route::Compress, ContentType::Code),
            ContentHint::Auto => {
                if self.looks_like_build(content) {
                    return (Route::Build, ContentType::Logs);
                }
                let detected = self.detector.detect(content);
                let route = match detected {
                    ContentType::Logs => Route::Logs,
                    ContentType::Stacktrace => Route::Errors,
                    ContentType::Code | ContentType::Generic => Route::Compress,
                };
                (route, detected)
            }
        }
    }

    fn looks_like_build(&self, content: &str) -> bool {
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(self.config.detection.sample_lines)
            .filter(|l| self.build_marker.is_match(l))
            .count()
            >= 2
    }
}
