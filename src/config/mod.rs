//! Configuration management for the condense engine
//!
//! Every tunable constant of the engine lives here: score weights,
//! detection sampling, compression budgets, and summarizer entry caps.
//! Defaults reproduce the engine's built-in behavior; a TOML file can
//! override any section.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compress::Detail;
use crate::error::{CondenseError, Result};
use crate::scoring::ScoreWeights;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub detection: DetectionConfig,
    pub compression: CompressionConfig,
    pub summary: SummaryConfig,
}

/// Weights for the segment importance score; must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub tfidf_weight: f32,
    pub position_weight: f32,
    pub keyword_weight: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tfidf_weight: 0.4,
            position_weight: 0.3,
            keyword_weight: 0.3,
        }
    }
}

impl ScoringConfig {
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            tfidf: self.tfidf_weight,
            position: self.position_weight,
            keyword: self.keyword_weight,
        }
    }
}

/// Content type detection limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Non-blank lines sampled for indicator density
    pub sample_lines: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { sample_lines: 100 }
    }
}

/// Compression thresholds and budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Below this many characters the orchestrator returns input unchanged
    pub min_optimize_chars: usize,
    /// Below this many tokens the strategies pass input through
    pub min_compress_tokens: usize,
    /// Hard cap on segments per compression call
    pub max_segments: usize,
    /// Budget ratios per detail level (fraction of original tokens kept)
    pub minimal_ratio: f32,
    pub normal_ratio: f32,
    pub detailed_ratio: f32,
    /// Unchanged diff context lines kept on each side of a change
    pub diff_context_margin: usize,
    /// Token bound per chunk in multi-file chunking
    pub max_chunk_tokens: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            min_optimize_chars: 500,
            min_compress_tokens: 50,
            max_segments: 4096,
            minimal_ratio: 0.25,
            normal_ratio: 0.45,
            detailed_ratio: 0.7,
            diff_context_margin: 2,
            max_chunk_tokens: 2000,
        }
    }
}

impl CompressionConfig {
    pub fn budget_ratio(&self, detail: Detail) -> f32 {
        match detail {
            Detail::Minimal => self.minimal_ratio,
            Detail::Normal => self.normal_ratio,
            Detail::Detailed => self.detailed_ratio,
        }
    }
}

/// Summarizer probes and entry caps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Non-blank lines sampled by applicability probes
    pub probe_lines: usize,
    /// Minimum request-line hit rate for the server summarizer
    pub server_hit_rate: f32,
    /// Minimum per-test hit rate for the test summarizer
    pub test_hit_rate: f32,
    /// Entry caps per detail level
    pub minimal_entries: usize,
    pub normal_entries: usize,
    pub detailed_entries: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            probe_lines: 100,
            server_hit_rate: 0.1,
            test_hit_rate: 0.1,
            minimal_entries: 5,
            normal_entries: 15,
            detailed_entries: 40,
        }
    }
}

impl SummaryConfig {
    pub fn max_entries(&self, detail: Detail) -> usize {
        match detail {
            Detail::Minimal => self.minimal_entries,
            Detail::Normal => self.normal_entries,
            Detail::Detailed => self.detailed_entries,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CondenseError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CondenseError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let config: EngineConfig = toml::from_str(&content)?;

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| CondenseError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Default config path under the user config directory
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| CondenseError::Config("Cannot determine config directory".to_string()))?;
        Ok(base.join("condense").join("config.toml"))
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }
}
