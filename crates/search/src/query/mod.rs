//! Query language
//!
//! Turns raw search input into an immutable [`Query`]:
//!
//! ```text
//! raw ──normalize──▶ clean ──lex──▶ tokens ──extract──▶ filters + free text
//! ```
//!
//! - `lexer`: whitespace tokens, quoted phrases, CJK segmentation
//! - `filters`: the typed filter values
//! - `extract`: the grammar fold and the lookup seam
//! - `dates`: relative and absolute date values

pub mod dates;
pub mod extract;
pub mod filters;
pub mod lexer;

pub use extract::{extract, ExtractContext, Extraction, FilterLookup};
pub use filters::{
    AuthorRole, Comparison, CountField, DateDirection, Filter, FilterSet, OrderBy, PmScope,
    ScopeFilter, TagMatch, TopicStatusFilter, UserIdentifier,
};
pub use lexer::{lex, QueryToken};

use crate::normalize::normalize;
use agora_core::{Locale, SearchContext, TypeFilter};
use serde::Serialize;

/// A parsed search request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Input exactly as received
    pub raw_term: String,
    /// Normalized input
    pub clean_term: String,
    /// Query locale
    pub locale: Locale,
    /// Extracted filters in token order
    pub filters: FilterSet,
    /// Requested result types
    pub type_scope: TypeFilter,
    /// Container the search is confined to
    pub context: Option<SearchContext>,
    /// Free-text tokens left after extraction
    pub terms: Vec<QueryToken>,
    /// Free text was segmented as CJK
    pub segmented: bool,
}

impl Query {
    /// Normalize, tokenize and extract filters
    #[allow(clippy::too_many_arguments)]
    pub fn parse(
        raw: &str,
        locale: Locale,
        type_scope: TypeFilter,
        context: Option<SearchContext>,
        segment_cjk: bool,
        lookup: &dyn FilterLookup,
        ctx: &ExtractContext,
    ) -> Self {
        let clean_term = normalize(Some(raw));
        let tokens = lex(&clean_term, segment_cjk);
        let Extraction { filters, remaining } = extract(tokens, lookup, ctx);
        Query {
            raw_term: raw.to_string(),
            clean_term,
            locale,
            filters,
            type_scope,
            context,
            terms: remaining,
            segmented: segment_cjk,
        }
    }

    /// Remaining free text, re-joined with single spaces
    pub fn free_text(&self) -> String {
        self.terms
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether any free text is left
    pub fn has_free_text(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Whether the query carries filters or a context
    pub fn is_scoped(&self) -> bool {
        !self.filters.is_empty() || self.context.is_some()
    }
}
