use std::collections::HashMap;
use std::path::Path;

use crate::alignment::diagnostics::diagnose;
use crate::alignment::scoring::align;
use crate::alignment::similarity::SimilarityTable;
use crate::config::AssessmentConfig;
use crate::error::{AssessmentError, CollaboratorError};
use crate::pipeline::traits::{PhonemeAligner, TextToPhonemes, WordDiagnoser};
use crate::types::{Alignment, AlignmentOutcome, PhonemeString, ReferenceUtterance, WordDiagnostic};

/// Common-subsequence alignment with partial credit for similar substitutions.
pub struct SimilarityAwareAligner {
    table: SimilarityTable,
    similarity_weight: f64,
}

impl SimilarityAwareAligner {
    pub fn new(table: SimilarityTable, similarity_weight: f64) -> Self {
        Self {
            table,
            similarity_weight,
        }
    }

    pub fn from_config(config: &AssessmentConfig) -> Self {
        Self::new(
            SimilarityTable::from_config(config),
            config.similarity_weight,
        )
    }
}

impl PhonemeAligner for SimilarityAwareAligner {
    fn align(&self, expected: &PhonemeString, detected: &PhonemeString) -> AlignmentOutcome {
        align(expected, detected, &self.table, self.similarity_weight)
    }
}

/// Proportional slicing of the global alignment followed by per-word re-alignment.
pub struct ProportionalDiagnoser;

impl WordDiagnoser for ProportionalDiagnoser {
    fn diagnose(
        &self,
        reference: &ReferenceUtterance,
        alignment: &Alignment,
        flat_detected: &PhonemeString,
        aligner: &dyn PhonemeAligner,
    ) -> Vec<WordDiagnostic> {
        diagnose(reference, alignment, flat_detected, |e, d| aligner.align(e, d))
    }
}

/// Dictionary-backed G2P: word -> raw IPA.
///
/// Keys are matched case-insensitively after trimming surrounding
/// punctuation. The language argument is ignored; load one lexicon per
/// language.
#[derive(Debug, Clone, Default)]
pub struct LexiconPhonemizer {
    entries: HashMap<String, String>,
}

impl LexiconPhonemizer {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (lexicon_key(k.as_ref()), v.into()))
                .collect(),
        }
    }

    /// Loads a JSON object mapping words to raw IPA strings.
    pub fn from_json_file(path: &Path) -> Result<Self, AssessmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read lexicon", e))?;
        let raw: HashMap<String, String> =
            serde_json::from_str(&data).map_err(|e| AssessmentError::json("parse lexicon", e))?;
        Ok(Self::from_entries(raw))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextToPhonemes for LexiconPhonemizer {
    fn text_to_phonemes(&self, unit: &str, _language: &str) -> Result<String, CollaboratorError> {
        self.entries
            .get(&lexicon_key(unit))
            .cloned()
            .ok_or_else(|| format!("'{unit}' is not in the lexicon").into())
    }
}

fn lexicon_key(word: &str) -> String {
    word.trim_matches(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '\''))
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::normalize::normalize;
    use crate::alignment::word_spans::build_reference;

    #[test]
    fn similarity_aware_aligner_uses_config_weight() {
        let aligner = SimilarityAwareAligner::from_config(&AssessmentConfig::default());
        let outcome = aligner.align(&normalize("θɪŋk"), &normalize("fɪŋk"));
        assert_eq!(outcome.baseline_accuracy, 75.0);
        assert!((outcome.accuracy - 95.0).abs() < 1e-9);

        let strict = SimilarityAwareAligner::new(SimilarityTable::default(), 0.8);
        assert_eq!(strict.align(&normalize("θɪŋk"), &normalize("fɪŋk")).accuracy, 75.0);
    }

    #[test]
    fn proportional_diagnoser_returns_one_entry_per_word() {
        let lexicon = LexiconPhonemizer::from_entries([("open", "ˈoʊpən"), ("file", "fˈaɪl")]);
        let reference = build_reference("open file", &[], "en", |w| {
            lexicon.text_to_phonemes(w, "en")
        })
        .expect("reference");
        let aligner = SimilarityAwareAligner::from_config(&AssessmentConfig::default());
        let detected = normalize("oʊpənfɛl");
        let global = aligner.align(reference.flat_expected(), &detected);
        let words =
            ProportionalDiagnoser.diagnose(&reference, &global.alignment, &detected, &aligner);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].detected_phonemes.to_string(), "fel");
    }

    #[test]
    fn lexicon_lookup_ignores_case_and_punctuation() {
        let lexicon = LexiconPhonemizer::from_entries([("Hello", "həlˈoʊ"), ("don't", "dˈoʊnt")]);
        assert_eq!(lexicon.text_to_phonemes("hello,", "en").expect("hit"), "həlˈoʊ");
        assert_eq!(lexicon.text_to_phonemes("\"HELLO!\"", "en").expect("hit"), "həlˈoʊ");
        assert_eq!(lexicon.text_to_phonemes("Don't", "en").expect("hit"), "dˈoʊnt");
        assert!(lexicon.text_to_phonemes("goodbye", "en").is_err());
    }

    #[test]
    fn lexicon_loads_from_json_file() {
        let path = std::env::temp_dir().join("pronounce_rs_lexicon_test.json");
        std::fs::write(&path, r#"{"open": "ˈoʊpən", "file": "fˈaɪl"}"#).expect("write lexicon");
        let lexicon = LexiconPhonemizer::from_json_file(&path).expect("load");
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.text_to_phonemes("File", "en").expect("hit"), "fˈaɪl");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn lexicon_file_errors_are_typed() {
        let missing = LexiconPhonemizer::from_json_file(Path::new("/nonexistent/lexicon.json"));
        assert!(matches!(missing, Err(AssessmentError::Io { .. })));

        let path = std::env::temp_dir().join("pronounce_rs_lexicon_bad.json");
        std::fs::write(&path, "[1, 2]").expect("write lexicon");
        let bad = LexiconPhonemizer::from_json_file(&path);
        assert!(matches!(bad, Err(AssessmentError::Json { .. })));
        let _ = std::fs::remove_file(&path);
    }
}
