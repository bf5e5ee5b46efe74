use crate::types::PhonemeString;

/// Stress marks emitted by G2P tools and recognizers, including ASCII stand-ins.
const STRESS_MARKS: &[char] = &['ˈ', 'ˌ', '`', '´', '\''];

/// Syllable and word separators that carry no phoneme.
const SEPARATORS: &[char] = &['.', '|', '-', '_'];

/// Allophone folding table, longest pattern first.
///
/// Replacements never contain a pattern's first symbol, which keeps
/// normalization idempotent.
const FOLDS: &[(&[char], &[char])] = &[
    (&['ə', 'ʊ'], &['o', 'ʊ']),
    (&['ɝ'], &['ɚ']),
    (&['ɜ'], &['ɚ']),
    (&['ɛ'], &['e']),
    (&['ɪ'], &['i']),
    (&['ɔ'], &['ɑ']),
    (&['r'], &['ɹ']),
    (&['g'], &['ɡ']),
    (&['ʧ'], &['t', 'ʃ']),
    (&['ʤ'], &['d', 'ʒ']),
    (&['ʦ'], &['t', 's']),
    (&['ʣ'], &['d', 'z']),
];

/// Canonicalizes a raw phoneme transcription from either collaborator.
///
/// Total and idempotent: `normalize(&normalize(x).to_string()) == normalize(x)`.
pub fn normalize(raw: &str) -> PhonemeString {
    let stripped: Vec<char> = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| !is_dropped(c))
        .collect();
    PhonemeString::from_symbols(fold(&stripped))
}

fn is_dropped(c: char) -> bool {
    c.is_whitespace()
        || STRESS_MARKS.contains(&c)
        || SEPARATORS.contains(&c)
        || is_bound_modifier(c)
}

/// Length marks, tie bars and diacritics that attach to the preceding base symbol.
fn is_bound_modifier(c: char) -> bool {
    matches!(
        c,
        '\u{02B0}'..='\u{02FF}'
            | '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
    )
}

fn fold(symbols: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(symbols.len());
    let mut i = 0;
    'outer: while i < symbols.len() {
        for (pattern, replacement) in FOLDS {
            if symbols[i..].starts_with(pattern) {
                out.extend_from_slice(replacement);
                i += pattern.len();
                continue 'outer;
            }
        }
        out.push(symbols[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> String {
        normalize(raw).to_string()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize("").is_empty());
        assert!(normalize("  ˈ ː ").is_empty());
    }

    #[test]
    fn strips_stress_and_length_marks() {
        assert_eq!(norm("ˈoʊpən"), "oʊpən");
        assert_eq!(norm("fˈaɪl"), "fail");
        assert_eq!(norm("sˈiːkwəns"), "sikwəns");
        assert_eq!(norm("kəmˌpjuːɾɚ"), "kəmpjuɾɚ");
    }

    #[test]
    fn strips_combining_diacritics_and_tie_bars() {
        assert_eq!(norm("t͡ʃ"), "tʃ");
        assert_eq!(norm("n̩"), "n");
        assert_eq!(norm("pʰɪn"), "pin");
    }

    #[test]
    fn folds_r_colored_vowel_variants() {
        assert_eq!(norm("wɝk"), "wɚk");
        assert_eq!(norm("wɜːk"), "wɚk");
        assert_eq!(norm("wɜ˞k"), "wɚk");
    }

    #[test]
    fn unifies_diphthong_notation() {
        assert_eq!(norm("ɡəʊ"), "ɡoʊ");
        assert_eq!(norm("ɡoʊ"), "ɡoʊ");
    }

    #[test]
    fn folds_ascii_and_ligature_spellings() {
        assert_eq!(norm("red"), "ɹed");
        assert_eq!(norm("go"), "ɡo");
        assert_eq!(norm("ʧɪp"), "tʃip");
        assert_eq!(norm("ʤʌmp"), "dʒʌmp");
    }

    #[test]
    fn folds_recognizer_and_dictionary_vowel_spellings() {
        assert_eq!(norm("ɪ"), norm("i"));
        assert_eq!(norm("ɛ"), norm("e"));
        assert_eq!(norm("ɔː"), norm("ɑː"));
        assert_eq!(norm("ʃɪp ɪz ɹɛd"), "ʃipizɹed");
        assert_eq!(norm("dˈɔːɹ"), "dɑɹ");
        assert_eq!(norm("bɔɪ"), "bɑi");
    }

    #[test]
    fn removes_whitespace_separators_and_case() {
        assert_eq!(norm("HƏ loʊ | wɜːld"), "həloʊwɚld");
        assert_eq!(norm("a.b-c_d"), "abcd");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "ˈoʊpən fˈaɪl",
            "əːʊ",
            "ɡəʊ ɜː r",
            "ʧɜːʧ ʤʌʤ",
            "ˌɪntəˈnæʃənəl",
            "HELLO wɜ˞ld",
            "ɐʊ əəʊ",
            "t͡ʃ d͡ʒ",
            "ɛɪɔː ɪɛ",
        ];
        for raw in samples {
            let once = normalize(raw);
            let twice = normalize(&once.to_string());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
