use crate::alignment::normalize::normalize;
use crate::error::{AssessmentError, CollaboratorError};
use crate::types::{PhonemeString, ReferenceUtterance, Span};

/// Builds the reference side of an assessment.
///
/// Each word token is phonemized on its own and normalized; the results are
/// concatenated into `flat_expected` with one contiguous span per token.
/// Phonemizing the whole phrase in one call could move sounds across word
/// boundaries, which would make spans unattributable.
///
/// When `word_tokens` is empty the tokens are the whitespace split of `text`.
pub fn build_reference<F>(
    text: &str,
    word_tokens: &[String],
    language: &str,
    mut phonemize: F,
) -> Result<ReferenceUtterance, AssessmentError>
where
    F: FnMut(&str) -> Result<String, CollaboratorError>,
{
    if text.trim().is_empty() {
        return Err(AssessmentError::invalid_input(
            "reference text is empty or whitespace-only",
        ));
    }
    let word_tokens = resolve_tokens(text, word_tokens)?;

    let mut per_word_phonemes = Vec::with_capacity(word_tokens.len());
    let mut word_spans = Vec::with_capacity(word_tokens.len());
    let mut offset = 0usize;
    for token in &word_tokens {
        let raw = phonemize(token)
            .map_err(|e| AssessmentError::phonemization(token.as_str(), e))?;
        let phonemes = normalize(&raw);
        tracing::debug!(
            token = token.as_str(),
            raw = raw.as_str(),
            normalized = %phonemes,
            "reference: phonemized word"
        );
        let span = Span::new(offset, offset + phonemes.len());
        offset = span.end;
        word_spans.push(span);
        per_word_phonemes.push(phonemes);
    }

    let flat_expected = PhonemeString::concat(&per_word_phonemes);
    if flat_expected.is_empty() {
        return Err(AssessmentError::phonemization(
            text,
            "no phonemes produced for any word",
        ));
    }
    debug_assert_eq!(flat_expected.len(), offset, "word spans must cover flat_expected");

    Ok(ReferenceUtterance {
        text: text.to_string(),
        language: language.to_string(),
        word_tokens,
        per_word_phonemes,
        flat_expected,
        word_spans,
    })
}

fn resolve_tokens(text: &str, word_tokens: &[String]) -> Result<Vec<String>, AssessmentError> {
    if word_tokens.is_empty() {
        return Ok(text.split_whitespace().map(str::to_string).collect());
    }
    if let Some(idx) = word_tokens.iter().position(|t| t.trim().is_empty()) {
        return Err(AssessmentError::invalid_input(format!(
            "word token #{idx} is blank"
        )));
    }
    Ok(word_tokens.iter().map(|t| t.trim().to_string()).collect())
}
