//! Text comparison helpers used by the overlap resolver.

const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Trimmed, lowercased text with trailing sentence punctuation removed.
pub fn clean_text(text: &str) -> String {
    text.trim()
        .trim_end_matches(TRAILING_PUNCTUATION)
        .trim_end()
        .to_lowercase()
}

/// Number of words in the cleaned text. Tokens made only of punctuation don't count.
pub fn word_count(text: &str) -> usize {
    clean_text(text)
        .split_whitespace()
        .filter(|token| !token.trim_matches(|c: char| c.is_ascii_punctuation()).is_empty())
        .count()
}

pub fn same_text(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}
