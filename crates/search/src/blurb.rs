//! Post excerpts
//!
//! A blurb is a window of the post body around the first word that starts
//! with a searched term. Whitespace runs collapse to single spaces and the
//! whole excerpt, ellipses included, never exceeds the configured length.

use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "...";

/// Build an excerpt of at most `max_len` characters
///
/// # Example
///
/// ```
/// use agora_search::blurb::blurb;
///
/// let text = "Crack the eggs into a bowl and whisk until smooth";
/// assert_eq!(blurb(text, &["whisk".to_string()], 100), text);
/// assert!(blurb(text, &["whisk".to_string()], 20).contains("whisk"));
/// ```
pub fn blurb(raw: &str, terms: &[String], max_len: usize) -> String {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text;
    }
    if max_len <= 2 * ELLIPSIS.len() {
        return chars[..max_len].iter().collect();
    }

    let window = max_len - 2 * ELLIPSIS.len();
    let anchor = first_match(&text, terms).unwrap_or(0);
    let start = anchor
        .saturating_sub(window / 3)
        .min(chars.len() - window);
    let end = start + window;

    let mut out = String::with_capacity(max_len * 4);
    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Char offset of the first word starting with any term
fn first_match(text: &str, terms: &[String]) -> Option<usize> {
    let terms: Vec<String> = terms
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return None;
    }
    text.unicode_word_indices()
        .find(|(_, word)| {
            let word = word.to_lowercase();
            terms.iter().any(|t| word.starts_with(t.as_str()))
        })
        .map(|(byte, _)| text[..byte].chars().count())
}
