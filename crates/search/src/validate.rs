//! Minimum term length gate
//!
//! A query is searchable when its free text holds a quoted phrase (any
//! length) or an unquoted term of at least the minimum length, or when it
//! carries filters or a search context. Everything else is reported as an
//! invalid query, never as an error.
//!
//! Lengths are measured on what reaches the index: a term made only of
//! punctuation or index syntax has no searchable content and never counts.

use crate::compiler::sanitize;
use crate::config::QueryConfig;
use crate::query::{Query, QueryToken};
use agora_core::SearchOptions;
use agora_store::tokenize;

/// Outcome of validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Searchable
    Valid,
    /// Free text present but every unquoted term is too short
    TooShort,
    /// Nothing to search for
    Empty,
}

impl Verdict {
    /// Whether the query may run
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Effective minimum term length
///
/// The per-request override wins; otherwise segmented CJK queries use the
/// CJK minimum and everything else the regular one.
pub fn min_term_length(options: &SearchOptions, config: &QueryConfig, segmented: bool) -> usize {
    options.min_search_term_length.unwrap_or(if segmented {
        config.cjk_min_search_term_length
    } else {
        config.min_search_term_length
    })
}

/// Characters of a token that survive sanitizing and tokenization
fn searchable_len(token: &QueryToken) -> usize {
    let raw = token.phrase_text().unwrap_or(&token.text);
    tokenize(&sanitize(raw))
        .iter()
        .map(|t| t.chars().count())
        .sum()
}

/// Validate a parsed query
pub fn validate(query: &Query, min_length: usize) -> Verdict {
    let has_term = query.terms.iter().any(|t| {
        let len = searchable_len(t);
        len > 0 && (t.quoted || len >= min_length)
    });
    if has_term || query.is_scoped() {
        Verdict::Valid
    } else if query.has_free_text() {
        Verdict::TooShort
    } else {
        Verdict::Empty
    }
}
