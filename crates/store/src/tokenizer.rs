//! Text tokenizer for indexing and query terms
//!
//! Pipeline: UAX#29 word boundaries → remove non-alphanumeric → lowercase
//!
//! No stopwords and no stemming: phrase matching compares token sequences
//! position by position, so documents and queries must tokenize identically
//! and every word must keep its slot.
//!
//! Han and Hiragana characters have no word-boundary rule joining them, so
//! UAX#29 already yields them one character at a time. Katakana runs and
//! Hangul syllable blocks stay together.

use unicode_segmentation::UnicodeSegmentation;

/// Tokenize text into searchable terms.
///
/// # Example
///
/// ```
/// use agora_store::tokenizer::tokenize;
///
/// let tokens = tokenize("Don't eat the Eggs!");
/// assert_eq!(tokens, vec!["dont", "eat", "the", "eggs"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Tokenize and deduplicate, keeping first-occurrence order.
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = rustc_hash::FxHashSet::default();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Whether a character belongs to a script written without spaces
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{3400}'..='\u{4DBF}' // CJK Extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}' // Hangul Syllables
        | '\u{F900}'..='\u{FAFF}' // CJK Compatibility Ideographs
        | '\u{20000}'..='\u{2A6DF}'
    )
}

/// Whether any character of `text` is CJK
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}
