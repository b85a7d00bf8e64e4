use std::collections::BTreeSet;

/// Lower-cased whitespace tokens. Punctuation stays attached: `"delay?"` and `"delay"` differ.
pub fn term_set(text: &str) -> BTreeSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Content terms of a question: `term_set` minus the given stop words.
pub fn content_terms(text: &str, stop_words: &[String]) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| !stop_words.iter().any(|s| s == w))
        .collect()
}

pub fn overlap_count(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
