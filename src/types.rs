use std::fmt;

use serde::{Serialize, Serializer};

/// Canonical phoneme symbols produced by [`crate::alignment::normalize::normalize`].
///
/// One `char` is one symbol: stress, length marks and bound diacritics have
/// already been removed, so positions and lengths count phonemes directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PhonemeString {
    symbols: Vec<char>,
}

impl PhonemeString {
    pub(crate) fn from_symbols(symbols: Vec<char>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols covered by `span`, clamped to the string bounds.
    pub fn slice(&self, span: Span) -> PhonemeString {
        let end = span.end.min(self.symbols.len());
        let start = span.start.min(end);
        Self::from_symbols(self.symbols[start..end].to_vec())
    }

    pub(crate) fn concat<'a>(parts: impl IntoIterator<Item = &'a PhonemeString>) -> PhonemeString {
        let symbols = parts
            .into_iter()
            .flat_map(|p| p.symbols.iter().copied())
            .collect();
        Self::from_symbols(symbols)
    }
}

impl fmt::Display for PhonemeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Serialize for PhonemeString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Half-open symbol range `[start, end)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Overlapping part of two spans, or `None` when they share no symbol.
    pub fn intersection(&self, other: Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then(|| Span::new(start, end))
    }
}

/// Reference phrase reduced to phonemes, one span per word token.
///
/// Built once per distinct phrase and shared read-only afterwards.
/// `word_spans` partition `[0, flat_expected.len())` contiguously in token order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceUtterance {
    pub(crate) text: String,
    pub(crate) language: String,
    pub(crate) word_tokens: Vec<String>,
    pub(crate) per_word_phonemes: Vec<PhonemeString>,
    pub(crate) flat_expected: PhonemeString,
    pub(crate) word_spans: Vec<Span>,
}

impl ReferenceUtterance {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn word_tokens(&self) -> &[String] {
        &self.word_tokens
    }

    pub fn per_word_phonemes(&self) -> &[PhonemeString] {
        &self.per_word_phonemes
    }

    pub fn flat_expected(&self) -> &PhonemeString {
        &self.flat_expected
    }

    pub fn word_spans(&self) -> &[Span] {
        &self.word_spans
    }

    pub fn word_count(&self) -> usize {
        self.word_tokens.len()
    }
}

/// Recognizer output after normalization. Carries no word structure.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedUtterance {
    pub raw_transcription: String,
    pub flat_detected: PhonemeString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Replace,
    Delete,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignmentOp {
    pub kind: OpKind,
    pub expected: Span,
    pub detected: Span,
}

/// Ordered opcodes covering both aligned strings exactly once, without gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub ops: Vec<AlignmentOp>,
}

impl Alignment {
    /// Number of symbols covered by `equal` ops.
    pub fn matched_symbols(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind == OpKind::Equal)
            .map(|op| op.expected.len())
            .sum()
    }
}

/// Alignment plus the accuracy figures derived from it, all in `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutcome {
    pub alignment: Alignment,
    pub baseline_accuracy: f64,
    pub phonetic_accuracy: f64,
    /// `max(baseline_accuracy, phonetic_accuracy)`.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WordErrorKind {
    Substitution,
    Omission,
    Insertion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordError {
    pub kind: WordErrorKind,
    /// Expected symbols involved; empty for insertions.
    pub expected: String,
    /// Detected symbols involved; empty for omissions.
    pub detected: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordDiagnostic {
    pub word: String,
    pub expected_phonemes: PhonemeString,
    pub detected_phonemes: PhonemeString,
    pub word_accuracy: f64,
    pub errors: Vec<WordError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictTier {
    Excellent,
    Acceptable,
    Insufficient,
}

/// Thresholds after the utterance-length adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedThresholds {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub overall_accuracy: f64,
    pub baseline_accuracy: f64,
    pub phonetic_accuracy: f64,
    pub verdict_tier: VerdictTier,
    pub thresholds: AppliedThresholds,
    pub expected_phonemes: PhonemeString,
    pub detected_phonemes: PhonemeString,
    /// Present only when `verdict_tier` is [`VerdictTier::Acceptable`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_diagnostics: Option<Vec<WordDiagnostic>>,
}

/// Recorded audio before preparation; `samples` are interleaved by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate_hz: u32,
    pub channels: u16,
}

impl Waveform {
    pub fn mono(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            samples,
            sample_rate_hz,
            channels: 1,
        }
    }
}
