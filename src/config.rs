use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub thresholds: ThresholdConfig,
    /// Match weight awarded to a single-symbol substitution inside one similarity group.
    pub similarity_weight: f64,
    /// Groups of phonetically close symbols, in any notation the normalizer accepts.
    pub similarity_groups: Vec<Vec<String>>,
    pub expected_sample_rate_hz: u32,
    pub default_language: String,
}

impl AssessmentConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;
    pub const DEFAULT_SIMILARITY_WEIGHT: f64 = 0.8;

    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AssessmentError::io("read assessment config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AssessmentError::json("parse assessment config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssessmentError> {
        self.thresholds.validate()?;
        if !(0.0..=1.0).contains(&self.similarity_weight) {
            return Err(AssessmentError::invalid_config(format!(
                "similarity_weight must lie in [0, 1], got {}",
                self.similarity_weight
            )));
        }
        if self.expected_sample_rate_hz == 0 {
            return Err(AssessmentError::invalid_config(
                "expected_sample_rate_hz must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            similarity_weight: Self::DEFAULT_SIMILARITY_WEIGHT,
            similarity_groups: default_similarity_groups(),
            expected_sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            default_language: "en".to_string(),
        }
    }
}

/// Base verdict thresholds and the utterance-length adjustment of the lower bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub lower: f64,
    pub upper: f64,
    pub length_delta: f64,
    /// Utterances with at most this many words raise the lower bound by `length_delta`.
    pub short_utterance_max_words: usize,
    /// Utterances with at least this many words lower it by `length_delta`.
    pub long_utterance_min_words: usize,
}

impl ThresholdConfig {
    fn validate(&self) -> Result<(), AssessmentError> {
        for (name, value) in [("lower", self.lower), ("upper", self.upper)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(AssessmentError::invalid_config(format!(
                    "threshold '{name}' must lie in [0, 100], got {value}"
                )));
            }
        }
        if self.lower > self.upper {
            return Err(AssessmentError::invalid_config(format!(
                "lower threshold {} exceeds upper threshold {}",
                self.lower, self.upper
            )));
        }
        if !self.length_delta.is_finite() || self.length_delta < 0.0 {
            return Err(AssessmentError::invalid_config(format!(
                "length_delta must be a non-negative number, got {}",
                self.length_delta
            )));
        }
        if self.short_utterance_max_words >= self.long_utterance_min_words {
            return Err(AssessmentError::invalid_config(format!(
                "short_utterance_max_words ({}) must be below long_utterance_min_words ({})",
                self.short_utterance_max_words, self.long_utterance_min_words
            )));
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            lower: 68.0,
            upper: 84.0,
            length_delta: 3.0,
            short_utterance_max_words: 2,
            long_utterance_min_words: 5,
        }
    }
}

fn default_similarity_groups() -> Vec<Vec<String>> {
    const GROUPS: [&[&str]; 12] = [
        &["æ", "a", "ʌ"],
        &["o", "ɑ", "ʊ"],
        &["u", "ʊ"],
        &["θ", "f"],
        &["ð", "v"],
        &["s", "z"],
        &["ʃ", "ʒ"],
        &["t", "d"],
        &["k", "ɡ"],
        &["p", "b"],
        &["ɹ", "ɻ"],
        &["l", "ɫ"],
    ];
    GROUPS
        .iter()
        .map(|group| group.iter().map(|s| s.to_string()).collect())
        .collect()
}
