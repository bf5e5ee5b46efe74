use crate::error::CollaboratorError;
use crate::types::{Alignment, AlignmentOutcome, PhonemeString, ReferenceUtterance, WordDiagnostic};

/// Grapheme-to-phoneme conversion for a single word or phrase.
///
/// Returns raw IPA; normalization happens downstream.
pub trait TextToPhonemes: Send + Sync {
    fn text_to_phonemes(&self, unit: &str, language: &str) -> Result<String, CollaboratorError>;
}

/// Acoustic phoneme recognizer over mono samples at `sample_rate_hz`.
///
/// May return an empty string for silence.
pub trait AudioToPhonemes: Send + Sync {
    fn audio_to_phonemes(
        &self,
        samples: &[f32],
        sample_rate_hz: u32,
    ) -> Result<String, CollaboratorError>;
}

pub trait PhonemeAligner: Send + Sync {
    fn align(&self, expected: &PhonemeString, detected: &PhonemeString) -> AlignmentOutcome;
}

pub trait WordDiagnoser: Send + Sync {
    /// One diagnostic per reference word, in order.
    fn diagnose(
        &self,
        reference: &ReferenceUtterance,
        alignment: &Alignment,
        flat_detected: &PhonemeString,
        aligner: &dyn PhonemeAligner,
    ) -> Vec<WordDiagnostic>;
}
