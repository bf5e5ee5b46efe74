mod slicing;

use crate::types::{
    Alignment, AlignmentOutcome, OpKind, PhonemeString, ReferenceUtterance, WordDiagnostic,
    WordError, WordErrorKind,
};

/// Per-word diagnostics reconstructed from one whole-utterance alignment.
///
/// For each reference word the detected symbols are recovered by
/// proportional slicing of the global alignment, then re-aligned locally with
/// `local_align` to obtain the word accuracy and its error list. Always
/// returns one entry per reference word, in order.
pub fn diagnose<F>(
    reference: &ReferenceUtterance,
    alignment: &Alignment,
    flat_detected: &PhonemeString,
    local_align: F,
) -> Vec<WordDiagnostic>
where
    F: Fn(&PhonemeString, &PhonemeString) -> AlignmentOutcome,
{
    let slices = slicing::word_slices(
        reference.word_spans(),
        alignment,
        reference.flat_expected().len(),
    );

    reference
        .word_tokens()
        .iter()
        .zip(reference.per_word_phonemes())
        .zip(slices)
        .map(|((word, expected), word_slices)| {
            let pieces: Vec<PhonemeString> =
                word_slices.iter().map(|s| flat_detected.slice(*s)).collect();
            let detected = PhonemeString::concat(&pieces);
            let diagnostic = diagnose_word(word, expected, detected, &local_align);
            tracing::debug!(
                word = word.as_str(),
                expected = %diagnostic.expected_phonemes,
                detected = %diagnostic.detected_phonemes,
                word_accuracy = diagnostic.word_accuracy,
                errors = diagnostic.errors.len(),
                "diagnostics: word reconstructed"
            );
            diagnostic
        })
        .collect()
}

fn diagnose_word<F>(
    word: &str,
    expected: &PhonemeString,
    detected: PhonemeString,
    local_align: &F,
) -> WordDiagnostic
where
    F: Fn(&PhonemeString, &PhonemeString) -> AlignmentOutcome,
{
    if detected.is_empty() && !expected.is_empty() {
        let missing = expected.to_string();
        return WordDiagnostic {
            word: word.to_string(),
            expected_phonemes: expected.clone(),
            detected_phonemes: detected,
            word_accuracy: 0.0,
            errors: vec![WordError {
                kind: WordErrorKind::Omission,
                detail: format!("omitted {missing}"),
                expected: missing,
                detected: String::new(),
            }],
        };
    }

    let outcome = local_align(expected, &detected);
    let errors = word_errors(&outcome.alignment, expected, &detected);
    WordDiagnostic {
        word: word.to_string(),
        expected_phonemes: expected.clone(),
        detected_phonemes: detected,
        word_accuracy: outcome.accuracy,
        errors,
    }
}

fn word_errors(
    alignment: &Alignment,
    expected: &PhonemeString,
    detected: &PhonemeString,
) -> Vec<WordError> {
    alignment
        .ops
        .iter()
        .filter_map(|op| {
            let x = expected.slice(op.expected).to_string();
            let y = detected.slice(op.detected).to_string();
            let (kind, detail) = match op.kind {
                OpKind::Equal => return None,
                OpKind::Replace => {
                    (WordErrorKind::Substitution, format!("substituted {y} for {x}"))
                }
                OpKind::Delete => (WordErrorKind::Omission, format!("omitted {x}")),
                OpKind::Insert => (WordErrorKind::Insertion, format!("inserted extra {y}")),
            };
            Some(WordError {
                kind,
                expected: x,
                detected: y,
                detail,
            })
        })
        .collect()
}
