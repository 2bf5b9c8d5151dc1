//! Small text helpers shared by the extractors.

/// Lower-cased, trimmed, whitespace-collapsed copy of `text`.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Alphanumeric tokens of already-normalised text.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Whether some token starts with `word`, so "walls" matches "wall" but
/// "suitable" does not match "table".
pub fn has_word(text: &str, word: &str) -> bool {
    tokens(text).any(|t| t.starts_with(word))
}

/// Whether any of `needles` occurs as a substring.
pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  Weiße   Wandleuchte\t3000K "), "weiße wandleuchte 3000k");
    }

    #[test]
    fn tokens_split_on_punctuation() {
        let t: Vec<_> = tokens("led-strip, 3000k?").collect();
        assert_eq!(t, vec!["led", "strip", "3000k"]);
    }

    #[test]
    fn has_word_matches_token_prefix_only() {
        assert!(has_word("two walls", "wall"));
        assert!(!has_word("is it suitable", "table"));
        assert!(has_word("im badezimmer", "bad"));
    }
}
