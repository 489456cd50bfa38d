use crate::config::EngineConfig;
use crate::error::{CondenseError, Result, ValidationError};

/// Configuration validator
///
/// Collects every violation instead of bailing on the first, so a broken
/// file reports all of its problems at once.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &EngineConfig) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_scoring(config, &mut errors);
        Self::validate_detection(config, &mut errors);
        Self::validate_compression(config, &mut errors);
        Self::validate_summary(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CondenseError::ConfigValidation { errors })
        }
    }

    fn validate_scoring(config: &EngineConfig, errors: &mut Vec<ValidationError>) {
        let s = &config.scoring;
        for (path, value) in [
            ("scoring.tfidf_weight", s.tfidf_weight),
            ("scoring.position_weight", s.position_weight),
            ("scoring.keyword_weight", s.keyword_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ValidationError::new(
                    path,
                    format!("Weight must be in [0, 1], got {}", value),
                ));
            }
        }

        let sum = s.tfidf_weight + s.position_weight + s.keyword_weight;
        if (sum - 1.0).abs() > 1e-3 {
            errors.push(ValidationError::new(
                "scoring",
                format!("Weights must sum to 1.0, got {}", sum),
            ));
        }
    }

    fn validate_detection(config: &EngineConfig, errors: &mut Vec<ValidationError>) {
        if config.detection.sample_lines == 0 {
            errors.push(ValidationError::new(
                "detection.sample_lines",
                "Sample size must be greater than 0",
            ));
        }
    }

    fn validate_compression(config: &EngineConfig, errors: &mut Vec<ValidationError>) {
        let c = &config.compression;
        for (path, ratio) in [
            ("compression.minimal_ratio", c.minimal_ratio),
            ("compression.normal_ratio", c.normal_ratio),
            ("compression.detailed_ratio", c.detailed_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                errors.push(ValidationError::new(
                    path,
                    format!("Budget ratio must be in (0, 1], got {}", ratio),
                ));
            }
        }

        if c.max_segments == 0 {
            errors.push(ValidationError::new(
                "compression.max_segments",
                "Segment cap must be greater than 0",
            ));
        }

        if c.max_chunk_tokens == 0 {
            errors.push(ValidationError::new(
                "compression.max_chunk_tokens",
                "Chunk token bound must be greater than 0",
            ));
        }
    }

    fn validate_summary(config: &EngineConfig, errors: &mut Vec<ValidationError>) {
        let s = &config.summary;
        if s.probe_lines == 0 {
            errors.push(ValidationError::new(
                "summary.probe_lines",
                "Probe size must be greater than 0",
            ));
        }

        for (path, rate) in [
            ("summary.server_hit_rate", s.server_hit_rate),
            ("summary.test_hit_rate", s.test_hit_rate),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                errors.push(ValidationError::new(
                    path,
                    format!("Hit rate must be in (0, 1], got {}", rate),
                ));
            }
        }

        for (path, cap) in [
            ("summary.minimal_entries", s.minimal_entries),
            ("summary.normal_entries", s.normal_entries),
            ("summary.detailed_entries", s.detailed_entries),
        ] {
            if cap == 0 {
                errors.push(ValidationError::new(
                    path,
                    "Entry cap must be greater than 0",
                ));
            }
        }
    }
}
