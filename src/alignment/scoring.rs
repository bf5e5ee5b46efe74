use crate::alignment::matcher::align_symbols;
use crate::alignment::similarity::SimilarityTable;
use crate::types::{Alignment, AlignmentOutcome, OpKind, PhonemeString};

/// Aligns two normalized phoneme strings and scores the match.
///
/// Baseline accuracy is `2*M / (len(expected) + len(detected)) * 100` with
/// `M` the symbols covered by `equal` ops. The phonetic-aware variant adds
/// `similarity_weight` to `M` for every single-symbol `replace` whose two
/// symbols share a similarity group. The reported accuracy is the larger of
/// the two.
pub fn align(
    expected: &PhonemeString,
    detected: &PhonemeString,
    table: &SimilarityTable,
    similarity_weight: f64,
) -> AlignmentOutcome {
    let alignment = align_symbols(expected.symbols(), detected.symbols());
    let total = expected.len() + detected.len();

    let matched = alignment.matched_symbols() as f64;
    let partial = similar_substitutions(&alignment, expected, detected, table) as f64;

    let baseline_accuracy = match_ratio(matched, expected.len(), detected.len());
    let phonetic_accuracy =
        match_ratio(matched + similarity_weight * partial, expected.len(), detected.len());
    let accuracy = baseline_accuracy.max(phonetic_accuracy);

    tracing::debug!(
        expected = %expected,
        detected = %detected,
        total_symbols = total,
        matched,
        similar_substitutions = partial,
        baseline_accuracy,
        phonetic_accuracy,
        "scoring: aligned phoneme strings"
    );

    AlignmentOutcome {
        alignment,
        baseline_accuracy,
        phonetic_accuracy,
        accuracy,
    }
}

/// Baseline accuracy alone. Symmetric in its arguments.
pub fn baseline_accuracy(expected: &PhonemeString, detected: &PhonemeString) -> f64 {
    let alignment = align_symbols(expected.symbols(), detected.symbols());
    match_ratio(
        alignment.matched_symbols() as f64,
        expected.len(),
        detected.len(),
    )
}

fn match_ratio(matched: f64, expected_len: usize, detected_len: usize) -> f64 {
    match (expected_len, detected_len) {
        (0, 0) => 100.0,
        (0, _) | (_, 0) => 0.0,
        (e, d) => (2.0 * matched / (e + d) as f64 * 100.0).clamp(0.0, 100.0),
    }
}

fn similar_substitutions(
    alignment: &Alignment,
    expected: &PhonemeString,
    detected: &PhonemeString,
    table: &SimilarityTable,
) -> usize {
    alignment
        .ops
        .iter()
        .filter(|op| op.kind == OpKind::Replace)
        .filter(|op| op.expected.len() == 1 && op.detected.len() == 1)
        .filter(|op| {
            table.are_similar(
                expected.symbols()[op.expected.start],
                detected.symbols()[op.detected.start],
            )
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::normalize::normalize;
    use crate::config::AssessmentConfig;

    fn table() -> SimilarityTable {
        SimilarityTable::from_config(&AssessmentConfig::default())
    }

    fn score(expected: &str, detected: &str) -> AlignmentOutcome {
        align(&normalize(expected), &normalize(detected), &table(), 0.8)
    }

    #[test]
    fn both_empty_scores_full_marks() {
        let outcome = score("", "");
        assert_eq!(outcome.accuracy, 100.0);
        assert_eq!(outcome.baseline_accuracy, 100.0);
        assert!(outcome.alignment.ops.is_empty());
    }

    #[test]
    fn exactly_one_empty_scores_zero() {
        assert_eq!(score("", "abc").accuracy, 0.0);
        assert_eq!(score("abc", "").accuracy, 0.0);
        assert_eq!(baseline_accuracy(&normalize(""), &normalize("ab")), 0.0);
        assert_eq!(baseline_accuracy(&normalize("ab"), &normalize("")), 0.0);
    }

    #[test]
    fn identical_strings_score_full_marks() {
        for s in ["a", "oʊpən", "ðəkwɪkbɹaʊnfɑks"] {
            assert_eq!(score(s, s).accuracy, 100.0);
        }
    }

    #[test]
    fn baseline_accuracy_is_symmetric() {
        let pairs = [
            ("oʊpənfaɪl", "oʊpənfɛl"),
            ("abcabc", "cbacba"),
            ("kəmpjutɚ", "kampjudə"),
            ("θɪŋk", "fɪŋ"),
            ("ab", "ba"),
        ];
        for (a, b) in pairs {
            let (a, b) = (normalize(a), normalize(b));
            assert_eq!(baseline_accuracy(&a, &b), baseline_accuracy(&b, &a));
        }
    }

    #[test]
    fn baseline_follows_matched_symbol_ratio() {
        // 7 matched of 9 + 8 symbols.
        let outcome = score("oʊpənfaɪl", "oʊpənfɛl");
        let expected = 2.0 * 7.0 / 17.0 * 100.0;
        assert!((outcome.baseline_accuracy - expected).abs() < 1e-9);
        // The replace spans two expected symbols, so no partial credit.
        assert_eq!(outcome.phonetic_accuracy, outcome.baseline_accuracy);
    }

    #[test]
    fn similar_single_symbol_substitution_earns_partial_credit() {
        // θ -> f shares a group: M = 3 + 0.8.
        let outcome = score("θɪŋk", "fɪŋk");
        assert!((outcome.baseline_accuracy - 75.0).abs() < 1e-9);
        assert!((outcome.phonetic_accuracy - 95.0).abs() < 1e-9);
        assert_eq!(outcome.accuracy, outcome.phonetic_accuracy);
    }

    #[test]
    fn dictionary_and_recognizer_vowel_notation_scores_full_marks() {
        assert_eq!(score("ʃɪp ɪz ɹɛd", "ʃip iz ɹed").accuracy, 100.0);
        assert_eq!(score("dˈɔːɹ", "dɑːɹ").accuracy, 100.0);
    }

    #[test]
    fn dissimilar_substitution_earns_nothing_extra() {
        let outcome = score("θɪŋk", "mɪŋk");
        assert_eq!(outcome.phonetic_accuracy, outcome.baseline_accuracy);
        assert!((outcome.accuracy - 75.0).abs() < 1e-9);
    }

    #[test]
    fn zero_weight_disables_partial_credit() {
        let outcome = align(&normalize("θɪŋk"), &normalize("fɪŋk"), &table(), 0.0);
        assert_eq!(outcome.accuracy, outcome.baseline_accuracy);
    }
}
