use std::sync::Arc;

use crate::alignment::normalize::normalize;
use crate::alignment::verdict::ThresholdPolicy;
use crate::alignment::word_spans::build_reference;
use crate::audio;
use crate::config::AssessmentConfig;
use crate::error::AssessmentError;
use crate::pipeline::cache::ReferenceCache;
use crate::pipeline::traits::{AudioToPhonemes, PhonemeAligner, TextToPhonemes, WordDiagnoser};
use crate::types::{
    AssessmentResult, RecognizedUtterance, ReferenceUtterance, VerdictTier, Waveform,
};

/// Grades one spoken attempt at a reference phrase per call.
///
/// Holds no per-submission state; the only shared state is the reference
/// cache, so one instance can serve many threads. Every call blocks on the
/// collaborators and should run off any latency-sensitive thread.
pub struct Assessor {
    config: AssessmentConfig,
    policy: ThresholdPolicy,
    text_to_phonemes: Box<dyn TextToPhonemes>,
    audio_to_phonemes: Option<Box<dyn AudioToPhonemes>>,
    aligner: Box<dyn PhonemeAligner>,
    word_diagnoser: Box<dyn WordDiagnoser>,
    reference_cache: Arc<ReferenceCache>,
}

pub(crate) struct AssessorParts {
    pub config: AssessmentConfig,
    pub policy: ThresholdPolicy,
    pub text_to_phonemes: Box<dyn TextToPhonemes>,
    pub audio_to_phonemes: Option<Box<dyn AudioToPhonemes>>,
    pub aligner: Box<dyn PhonemeAligner>,
    pub word_diagnoser: Box<dyn WordDiagnoser>,
    pub reference_cache: Arc<ReferenceCache>,
}

impl Assessor {
    pub(crate) fn from_parts(parts: AssessorParts) -> Self {
        Self {
            config: parts.config,
            policy: parts.policy,
            text_to_phonemes: parts.text_to_phonemes,
            audio_to_phonemes: parts.audio_to_phonemes,
            aligner: parts.aligner,
            word_diagnoser: parts.word_diagnoser,
            reference_cache: parts.reference_cache,
        }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn reference_cache(&self) -> &Arc<ReferenceCache> {
        &self.reference_cache
    }

    /// Scores a recorded attempt.
    ///
    /// An empty `word_tokens` means the whitespace split of `reference_text`;
    /// an empty `language` means the configured default.
    pub fn assess(
        &self,
        reference_text: &str,
        word_tokens: &[String],
        waveform: &Waveform,
        language: &str,
    ) -> Result<AssessmentResult, AssessmentError> {
        ensure_reference_text(reference_text)?;
        let reference = self.reference(reference_text, word_tokens, language)?;
        let recognized = self.recognize(waveform)?;
        Ok(self.score(&reference, &recognized))
    }

    /// Scores a raw phoneme transcription produced by a recognizer elsewhere.
    pub fn assess_transcription(
        &self,
        reference_text: &str,
        word_tokens: &[String],
        raw_detected: &str,
        language: &str,
    ) -> Result<AssessmentResult, AssessmentError> {
        ensure_reference_text(reference_text)?;
        let reference = self.reference(reference_text, word_tokens, language)?;
        let recognized = RecognizedUtterance {
            raw_transcription: raw_detected.to_string(),
            flat_detected: normalize(raw_detected),
        };
        Ok(self.score(&reference, &recognized))
    }

    /// Cached reference for a phrase; built on first use.
    pub fn reference(
        &self,
        text: &str,
        word_tokens: &[String],
        language: &str,
    ) -> Result<Arc<ReferenceUtterance>, AssessmentError> {
        let language = self.language_or_default(language);
        self.reference_cache
            .get_or_try_insert_with(language, text, word_tokens, || {
                build_reference(text, word_tokens, language, |unit| {
                    self.text_to_phonemes
                        .text_to_phonemes(unit, language)
                        .inspect_err(|e| {
                            tracing::warn!(unit, language, error = %e, "text-to-phonemes failed")
                        })
                })
            })
    }

    /// Prepares the waveform and runs the acoustic recognizer.
    pub fn recognize(&self, waveform: &Waveform) -> Result<RecognizedUtterance, AssessmentError> {
        let recognizer = self.audio_to_phonemes.as_deref().ok_or_else(|| {
            AssessmentError::recognition_unavailable("no acoustic recognizer configured")
        })?;
        let target_rate_hz = self.config.expected_sample_rate_hz;
        let samples = audio::prepare(waveform, target_rate_hz)?;
        let raw_transcription = recognizer
            .audio_to_phonemes(&samples, target_rate_hz)
            .map_err(|e| {
                tracing::warn!(error = %e, "audio-to-phonemes failed");
                AssessmentError::recognition_unavailable(e)
            })?;
        let flat_detected = normalize(&raw_transcription);
        tracing::debug!(
            raw = raw_transcription.as_str(),
            normalized = %flat_detected,
            "recognized utterance"
        );
        Ok(RecognizedUtterance {
            raw_transcription,
            flat_detected,
        })
    }

    fn score(
        &self,
        reference: &ReferenceUtterance,
        recognized: &RecognizedUtterance,
    ) -> AssessmentResult {
        let detected = &recognized.flat_detected;
        let outcome = self.aligner.align(reference.flat_expected(), detected);
        let word_count = reference.word_count();

        let (verdict_tier, thresholds) = if detected.is_empty() {
            (
                VerdictTier::Insufficient,
                self.policy.thresholds_for(word_count),
            )
        } else {
            self.policy.classify(outcome.accuracy, word_count)
        };

        let word_diagnostics = verdict_tier.wants_diagnostics().then(|| {
            self.word_diagnoser.diagnose(
                reference,
                &outcome.alignment,
                detected,
                self.aligner.as_ref(),
            )
        });

        tracing::info!(
            text = reference.text(),
            language = reference.language(),
            words = word_count,
            accuracy = outcome.accuracy,
            tier = ?verdict_tier,
            "assessment complete"
        );

        AssessmentResult {
            overall_accuracy: outcome.accuracy,
            baseline_accuracy: outcome.baseline_accuracy,
            phonetic_accuracy: outcome.phonetic_accuracy,
            verdict_tier,
            thresholds,
            expected_phonemes: reference.flat_expected().clone(),
            detected_phonemes: detected.clone(),
            word_diagnostics,
        }
    }

    fn language_or_default<'a>(&'a self, language: &'a str) -> &'a str {
        if language.trim().is_empty() {
            self.config.default_language.as_str()
        } else {
            language
        }
    }
}

fn ensure_reference_text(text: &str) -> Result<(), AssessmentError> {
    if text.trim().is_empty() {
        return Err(AssessmentError::invalid_input(
            "reference text is empty or whitespace-only",
        ));
    }
    Ok(())
}
