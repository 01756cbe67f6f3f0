//! Text normalization and tokenization.
//!
//! Prompts arrive in Albanian, Macedonian (Latin transliteration) and English,
//! with diacritics used inconsistently. Everything downstream matches against
//! the folded form produced here.

use unicode_normalization::UnicodeNormalization;

/// Default cap on tokens considered per prompt.
pub const DEFAULT_MAX_TOKENS: usize = 80;

/// Combining Diacritical Marks block.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Lowercase, strip diacritics, keep only `[a-z0-9 ]`, collapse whitespace.
pub fn normalize(input: &str) -> String {
    let folded = input
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize and split into at most `max_tokens` tokens.
pub fn tokenize(input: &str, max_tokens: usize) -> Vec<String> {
    tokens_of(&normalize(input), max_tokens)
}

/// Split already-normalized text into at most `max_tokens` tokens.
pub fn tokens_of(normalized: &str, max_tokens: usize) -> Vec<String> {
    normalized
        .split(' ')
        .filter(|t| !t.is_empty())
        .take(max_tokens)
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_diacritics_and_punctuation() {
        assert_eq!(normalize("Ndërtim, RENOVIM!!  çati  "), "ndertim renovim cati");
        assert_eq!(normalize("Kyçje e rrymës?"), "kycje e rrymes");
    }

    #[test]
    fn test_normalize_keeps_digits_splits_decimals() {
        // The dot in "17.3" is not alphanumeric.
        assert_eq!(normalize("17.3 kW"), "17 3 kw");
        assert_eq!(normalize("120m2"), "120m2");
    }

    #[test]
    fn test_normalize_drops_non_latin_scripts() {
        assert_eq!(normalize("струја evn"), "evn");
        assert_eq!(normalize("\u{0}\u{7f}\t\n"), "");
    }

    #[test]
    fn test_tokenize_caps_length() {
        assert_eq!(tokenize("a b c d", 2), vec!["a", "b"]);
        assert!(tokenize("   ", DEFAULT_MAX_TOKENS).is_empty());
        assert!(tokenize("", DEFAULT_MAX_TOKENS).is_empty());
    }

    #[test]
    fn test_tokenize_long_input_is_bounded() {
        let long = "shtepi ".repeat(10_000);
        assert_eq!(tokenize(&long, DEFAULT_MAX_TOKENS).len(), DEFAULT_MAX_TOKENS);
    }
}
