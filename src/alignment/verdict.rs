use crate::config::ThresholdConfig;
use crate::types::{AppliedThresholds, VerdictTier};

/// Stateless three-tier classifier over overall accuracy.
///
/// Short utterances raise the lower bound by `length_delta`, long ones lower
/// it by the same amount; both bounds are clamped to `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    config: ThresholdConfig,
}

impl ThresholdPolicy {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn thresholds_for(&self, word_count: usize) -> AppliedThresholds {
        let mut lower = self.config.lower;
        if word_count <= self.config.short_utterance_max_words {
            lower += self.config.length_delta;
        } else if word_count >= self.config.long_utterance_min_words {
            lower -= self.config.length_delta;
        }
        AppliedThresholds {
            lower: lower.clamp(0.0, 100.0),
            upper: self.config.upper.clamp(0.0, 100.0),
        }
    }

    pub fn classify(&self, accuracy: f64, word_count: usize) -> (VerdictTier, AppliedThresholds) {
        let thresholds = self.thresholds_for(word_count);
        let tier = if accuracy >= thresholds.upper {
            VerdictTier::Excellent
        } else if accuracy >= thresholds.lower {
            VerdictTier::Acceptable
        } else {
            VerdictTier::Insufficient
        };
        tracing::debug!(
            accuracy,
            word_count,
            lower = thresholds.lower,
            upper = thresholds.upper,
            tier = ?tier,
            "verdict: classified accuracy"
        );
        (tier, thresholds)
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

impl VerdictTier {
    /// Word diagnostics are only worth computing for the middle tier.
    pub fn wants_diagnostics(self) -> bool {
        self == VerdictTier::Acceptable
    }

    pub fn headline(self) -> &'static str {
        match self {
            VerdictTier::Excellent => "Excellent pronunciation!",
            VerdictTier::Acceptable => "Good, but there is room to improve.",
            VerdictTier::Insufficient => "I couldn't make that out. Practice a bit more and try again.",
        }
    }
}
