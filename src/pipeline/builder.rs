use std::sync::Arc;

use crate::alignment::verdict::ThresholdPolicy;
use crate::config::AssessmentConfig;
use crate::error::AssessmentError;
use crate::pipeline::cache::ReferenceCache;
use crate::pipeline::defaults::{ProportionalDiagnoser, SimilarityAwareAligner};
use crate::pipeline::runtime::{Assessor, AssessorParts};
use crate::pipeline::traits::{AudioToPhonemes, PhonemeAligner, TextToPhonemes, WordDiagnoser};

pub struct AssessorBuilder {
    config: AssessmentConfig,
    text_to_phonemes: Option<Box<dyn TextToPhonemes>>,
    audio_to_phonemes: Option<Box<dyn AudioToPhonemes>>,
    aligner: Option<Box<dyn PhonemeAligner>>,
    word_diagnoser: Option<Box<dyn WordDiagnoser>>,
    reference_cache: Option<Arc<ReferenceCache>>,
}

impl AssessorBuilder {
    pub fn new(config: AssessmentConfig) -> Self {
        Self {
            config,
            text_to_phonemes: None,
            audio_to_phonemes: None,
            aligner: None,
            word_diagnoser: None,
            reference_cache: None,
        }
    }

    pub fn with_text_to_phonemes(mut self, text_to_phonemes: Box<dyn TextToPhonemes>) -> Self {
        self.text_to_phonemes = Some(text_to_phonemes);
        self
    }

    pub fn with_audio_to_phonemes(mut self, audio_to_phonemes: Box<dyn AudioToPhonemes>) -> Self {
        self.audio_to_phonemes = Some(audio_to_phonemes);
        self
    }

    pub fn with_aligner(mut self, aligner: Box<dyn PhonemeAligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn with_word_diagnoser(mut self, word_diagnoser: Box<dyn WordDiagnoser>) -> Self {
        self.word_diagnoser = Some(word_diagnoser);
        self
    }

    /// Shares `reference_cache` with this assessor; otherwise a private one is created.
    pub fn with_reference_cache(mut self, reference_cache: Arc<ReferenceCache>) -> Self {
        self.reference_cache = Some(reference_cache);
        self
    }

    pub fn build(self) -> Result<Assessor, AssessmentError> {
        self.config.validate()?;
        let text_to_phonemes = self.text_to_phonemes.ok_or_else(|| {
            AssessmentError::invalid_config("a grapheme-to-phoneme converter is required")
        })?;
        if self.audio_to_phonemes.is_none() {
            tracing::debug!(
                "assessor built without an acoustic recognizer; only transcriptions can be scored"
            );
        }

        let aligner = self
            .aligner
            .unwrap_or_else(|| Box::new(SimilarityAwareAligner::from_config(&self.config)));

        Ok(Assessor::from_parts(AssessorParts {
            policy: ThresholdPolicy::new(self.config.thresholds.clone()),
            config: self.config,
            text_to_phonemes,
            audio_to_phonemes: self.audio_to_phonemes,
            aligner,
            word_diagnoser: self
                .word_diagnoser
                .unwrap_or_else(|| Box::new(ProportionalDiagnoser)),
            reference_cache: self
                .reference_cache
                .unwrap_or_else(|| Arc::new(ReferenceCache::new())),
        }))
    }
}
