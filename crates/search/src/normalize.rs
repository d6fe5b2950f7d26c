//! Text normalization for raw search input
//!
//! Pipeline: strip zero-width characters → straighten typographic quotes
//! → Unicode NFC → trim.
//!
//! The order matters for idempotence: zero-width characters are removed
//! before composition so a combining mark separated from its base by a
//! zero-width joiner still composes, and trimming runs last so whitespace
//! produced by NFC singleton mappings (U+2000 → U+2002) is removed too.

use unicode_normalization::UnicodeNormalization;

/// Characters removed anywhere in the input
const ZERO_WIDTH: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Map typographic quotes to their ASCII counterparts
fn straighten(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
        | '\u{00BB}' => '"',
        other => other,
    }
}

/// Normalize raw search input.
///
/// Never fails: `None` becomes the empty string.
///
/// # Example
///
/// ```
/// use agora_search::normalize::normalize;
///
/// assert_eq!(normalize(Some("  \u{201C}fried eggs\u{201D}\u{200B} ")), "\"fried eggs\"");
/// assert_eq!(normalize(None), "");
/// ```
pub fn normalize(input: Option<&str>) -> String {
    let Some(input) = input else {
        return String::new();
    };
    let composed: String = input
        .chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .map(straighten)
        .nfc()
        .collect();
    composed.trim().to_string()
}
