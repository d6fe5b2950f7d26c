//! Lexer for search input
//!
//! Splits normalized input on whitespace, keeping quoted phrases atomic.
//!
//! - `"..."` is always a phrase; an unterminated `"` runs to end of input.
//! - `'...'` is a phrase only when the opening quote starts a token and the
//!   closing quote is followed by whitespace or end of input, so apostrophes
//!   inside words (`don't`, `o'reilly`) never open a phrase.
//! - A `"` in the middle of a word ends the word and opens a phrase.
//!
//! With CJK segmentation enabled, unquoted free-text tokens containing
//! Han/Kana/Hangul are split further on UAX#29 word boundaries. Tokens that
//! look like filters (`#x`, `@x`, `key:value`) are left whole.

use agora_store::contains_cjk;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// A token of search input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryToken {
    /// Token text; phrases keep their surrounding quotes
    pub text: String,
    /// The token is a quoted phrase
    pub quoted: bool,
}

impl QueryToken {
    /// An unquoted word
    pub fn word(text: impl Into<String>) -> Self {
        QueryToken {
            text: text.into(),
            quoted: false,
        }
    }

    /// A phrase; `inner` is wrapped in double quotes
    pub fn phrase(inner: &str) -> Self {
        QueryToken {
            text: format!("\"{}\"", inner),
            quoted: true,
        }
    }

    /// Phrase content without the surrounding quotes
    pub fn phrase_text(&self) -> Option<&str> {
        if !self.quoted {
            return None;
        }
        let t = self.text.as_str();
        let inner = t
            .strip_prefix('"')
            .or_else(|| t.strip_prefix('\''))
            .unwrap_or(t);
        Some(
            inner
                .strip_suffix('"')
                .or_else(|| inner.strip_suffix('\''))
                .unwrap_or(inner),
        )
    }

    /// Number of characters in the token (quotes excluded for phrases)
    pub fn char_len(&self) -> usize {
        match self.phrase_text() {
            Some(inner) => inner.chars().count(),
            None => self.text.chars().count(),
        }
    }
}

/// Lexer over a normalized input string
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<QueryToken> {
        loop {
            self.skip_whitespace();
            if self.is_eof() {
                return None;
            }
            let token = match self.current_char() {
                '"' => self.read_double_quoted(),
                '\'' => match self.single_quote_end() {
                    Some(end) => self.read_single_quoted(end),
                    None => Some(self.read_word()),
                },
                _ => Some(self.read_word()),
            };
            // Empty phrases ("" or "   ") produce nothing
            if token.is_some() {
                return token;
            }
        }
    }

    /// Check if the lexer has reached the end of input
    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.current_char().is_whitespace() {
            self.position += 1;
        }
    }

    fn read_double_quoted(&mut self) -> Option<QueryToken> {
        self.position += 1;
        let mut inner = String::new();
        while !self.is_eof() {
            let ch = self.current_char();
            self.position += 1;
            if ch == '"' {
                break;
            }
            inner.push(ch);
        }
        let inner = inner.trim();
        (!inner.is_empty()).then(|| QueryToken::phrase(inner))
    }

    /// Index of the quote closing a single-quoted phrase opened here
    fn single_quote_end(&self) -> Option<usize> {
        let start = self.position + 1;
        (start..self.input.len()).find(|&i| {
            self.input[i] == '\''
                && i > start
                && self
                    .input
                    .get(i + 1)
                    .map_or(true, |next| next.is_whitespace())
        })
    }

    fn read_single_quoted(&mut self, end: usize) -> Option<QueryToken> {
        let inner: String = self.input[self.position + 1..end].iter().collect();
        self.position = end + 1;
        let inner = inner.trim();
        (!inner.is_empty()).then(|| QueryToken {
            text: format!("'{}'", inner),
            quoted: true,
        })
    }

    fn read_word(&mut self) -> QueryToken {
        let mut word = String::new();
        while !self.is_eof() {
            let ch = self.current_char();
            if ch.is_whitespace() || ch == '"' {
                break;
            }
            word.push(ch);
            self.position += 1;
        }
        QueryToken::word(word)
    }
}

impl Iterator for Lexer {
    type Item = QueryToken;

    fn next(&mut self) -> Option<QueryToken> {
        self.next_token()
    }
}

/// Whether a word has filter shape and must not be segmented
fn looks_like_filter(text: &str) -> bool {
    text.starts_with('#') || text.starts_with('@') || text.contains(':')
}

/// Split an unquoted CJK token on word boundaries
pub fn segment_cjk(token: QueryToken) -> Vec<QueryToken> {
    if token.quoted || looks_like_filter(&token.text) || !contains_cjk(&token.text) {
        return vec![token];
    }
    let parts: Vec<QueryToken> = token.text.unicode_words().map(QueryToken::word).collect();
    if parts.is_empty() {
        vec![token]
    } else {
        parts
    }
}

/// Tokenize normalized input
///
/// # Example
///
/// ```
/// use agora_search::query::lexer::lex;
///
/// let tokens = lex("tags:eggs \"fried rice\" don't", false);
/// assert_eq!(tokens.len(), 3);
/// assert!(tokens[1].quoted);
/// assert_eq!(tokens[2].text, "don't");
/// ```
pub fn lex(input: &str, cjk_segmentation: bool) -> Vec<QueryToken> {
    let tokens = Lexer::new(input);
    if cjk_segmentation {
        tokens.flat_map(segment_cjk).collect()
    } else {
        tokens.collect()
    }
}
