//! Word normalization for comparing lyrics against recognized words.

/// Lower-case and strip punctuation/whitespace from both edges.
pub fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// True if every character is whitespace (an empty slice is not blank).
pub fn is_blank(chars: &[char]) -> bool {
    !chars.is_empty() && chars.iter().all(|c| c.is_whitespace())
}
