//! Approximate matching: edit distance, length-scaled fuzzy equality and
//! literal containment.

/// Levenshtein distance (insert, delete and substitute each cost 1).
///
/// Works on chars, keeps two rolling rows sized to the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Columns follow the shorter string.
    let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (curr[j] + 1).min(prev[j + 1] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Maximum edit distance tolerated for a pair whose longer side has `len`
/// chars. `None` means exact match only.
pub fn allowed_distance(len: usize) -> Option<usize> {
    match len {
        0..=4 => Some(1),
        5..=7 => Some(2),
        8..=12 => Some(3),
        _ => None,
    }
}

/// Exact match, or an edit distance within the length-scaled tolerance.
pub fn fuzzy_token_match(token: &str, candidate: &str) -> bool {
    if token == candidate {
        return true;
    }

    let len = token.chars().count().max(candidate.chars().count());
    match allowed_distance(len) {
        Some(max) => levenshtein(token, candidate) <= max,
        None => false,
    }
}

/// Literal containment against already-normalized text.
pub fn phrase_in_text(phrase: &str, normalized_text: &str) -> bool {
    normalized_text.contains(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("rryme", "ryme"), 1);
        assert_eq!(levenshtein("", "evn"), 3);
        assert_eq!(levenshtein("evn", ""), 3);
        assert_eq!(levenshtein("beton", "beton"), 0);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("ë", "e"), 1);
    }

    #[test]
    fn test_levenshtein_symmetric() {
        let words = ["", "kw", "evn", "kycje", "kycja", "ndertim", "renovim", "pershendetje"];
        for a in words {
            for b in words {
                assert_eq!(levenshtein(a, b), levenshtein(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_fuzzy_tolerance_scales_with_length() {
        // len <= 4: one edit
        assert!(fuzzy_token_match("cati", "qati"));
        assert!(!fuzzy_token_match("cati", "faza"));
        assert!(fuzzy_token_match("hi", "si"));
        assert!(!fuzzy_token_match("kw", "me"));

        // len <= 7: two edits
        assert!(fuzzy_token_match("rryme", "ryme"));
        assert!(fuzzy_token_match("rrymes", "rryme"));
        assert!(!fuzzy_token_match("rryme", "xxxxx"));

        // len <= 12: three edits
        assert!(fuzzy_token_match("armaturave", "armature"));

        // len > 12: exact only
        assert!(!fuzzy_token_match("abcdefghijklmn", "abcdefghijklmo"));
        assert!(fuzzy_token_match("abcdefghijklmn", "abcdefghijklmn"));
    }

    #[test]
    fn test_phrase_in_text_is_literal() {
        assert!(phrase_in_text("sa kushton", "po sa kushton kycja"));
        assert!(!phrase_in_text("sa kushton", "kushton sa"));
    }
}
