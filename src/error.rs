use thiserror::Error;

/// Failure reported by an external collaborator (G2P converter, acoustic recognizer).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("audio format error: {message}")]
    AudioFormat { message: String },
    #[error("phoneme recognition unavailable: {message}")]
    RecognitionUnavailable { message: String },
    #[error("phonemization failed for '{unit}': {message}")]
    Phonemization { unit: String, message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl AssessmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn audio_format(message: impl Into<String>) -> Self {
        Self::AudioFormat {
            message: message.into(),
        }
    }

    pub(crate) fn recognition_unavailable(err: impl std::fmt::Display) -> Self {
        Self::RecognitionUnavailable {
            message: err.to_string(),
        }
    }

    pub(crate) fn phonemization(unit: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Phonemization {
            unit: unit.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
