pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::{AssessmentConfig, ThresholdConfig};
pub use error::{AssessmentError, CollaboratorError};
pub use pipeline::builder::AssessorBuilder;
pub use pipeline::cache::ReferenceCache;
pub use pipeline::defaults::{LexiconPhonemizer, ProportionalDiagnoser, SimilarityAwareAligner};
pub use pipeline::runtime::Assessor;
pub use pipeline::traits::{AudioToPhonemes, PhonemeAligner, TextToPhonemes, WordDiagnoser};
pub use types::{
    AssessmentResult, PhonemeString, ReferenceUtterance, VerdictTier, Waveform, WordDiagnostic,
};
