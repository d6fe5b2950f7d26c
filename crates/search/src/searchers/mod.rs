//! Per-type searchers
//!
//! Each searcher answers one entity kind. The engine runs the searchers a
//! request needs in parallel and merges their responses.
//!
//! - `posts`: text + predicates + visibility + ranking, optional per-topic grouping
//! - `users`, `categories`, `tags`, `groups`: free text only, visibility filtered
//!
//! Non-post facets never run for filter-only queries: the filter grammar
//! describes posts, so a query with no free text has nothing to match them on.

pub mod categories;
pub mod groups;
pub mod posts;
pub mod tags;
pub mod users;

pub use categories::CategorySearcher;
pub use groups::GroupSearcher;
pub use posts::PostSearcher;
pub use tags::TagSearcher;
pub use users::UserSearcher;

use crate::compiler::{CompiledQuery, TextQuery};
use crate::query::Query;
use crate::ranker::sort_by_relevance;
use crate::visibility::VisibilityScope;
use agora_core::{EntityKind, EntityRef, RankedCandidate, Result};
use agora_store::{Bm25Params, FullTextIndex};

// ============================================================================
// Request / response
// ============================================================================

/// Inputs shared by every searcher of one execution
pub struct SearchRequest<'a> {
    /// Parsed query
    pub query: &'a Query,
    /// Compiled query
    pub compiled: &'a CompiledQuery,
    /// Visibility scope
    pub scope: &'a VisibilityScope,
    /// Maximum rows to return
    pub limit: usize,
    /// Keep only the best post of each topic
    pub group_by_topic: bool,
}

/// Rows of one searcher, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Rows, at most `limit`
    pub hits: Vec<RankedCandidate>,
    /// Candidates examined before visibility and predicates
    pub candidates_considered: usize,
}

impl SearchResponse {
    /// An empty response
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A searcher for one entity kind
pub trait Searchable: Send + Sync {
    /// Run the search
    fn search(&self, req: &SearchRequest<'_>) -> Result<SearchResponse>;

    /// Kind of rows returned
    fn kind(&self) -> EntityKind;
}

// ============================================================================
// Shared facet search
// ============================================================================

/// Free-text search over one non-post kind
///
/// Fields are not restricted: `in:title` describes posts, and every facet
/// document already keeps its name in the title field.
pub(crate) fn facet_search<F>(
    index: &dyn FullTextIndex,
    params: &Bm25Params,
    kind: EntityKind,
    text: &TextQuery,
    limit: usize,
    visible: F,
) -> Result<SearchResponse>
where
    F: Fn(&EntityRef) -> bool,
{
    if text.is_empty() || limit == 0 {
        return Ok(SearchResponse::empty());
    }
    let index_query = TextQuery {
        fields: vec![],
        ..text.clone()
    }
    .to_index_query()
    .with_kinds(vec![kind])
    .with_params(*params);
    let hits = index.query(&index_query)?;
    let candidates_considered = hits.len();
    let mut rows: Vec<RankedCandidate> = hits
        .into_iter()
        .filter(|hit| visible(&hit.entity))
        .map(|hit| RankedCandidate::new(hit.entity, hit.score, 1.0))
        .collect();
    sort_by_relevance(&mut rows);
    rows.truncate(limit);
    Ok(SearchResponse {
        hits: rows,
        candidates_considered,
    })
}
