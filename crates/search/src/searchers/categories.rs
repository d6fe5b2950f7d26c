//! Category search

use super::{facet_search, SearchRequest, SearchResponse, Searchable};
use agora_core::{EntityKind, EntityRef, Result};
use agora_store::{Bm25Params, FullTextIndex};
use std::sync::Arc;

/// Searches category names, slugs and descriptions
pub struct CategorySearcher {
    index: Arc<dyn FullTextIndex>,
    params: Bm25Params,
}

impl CategorySearcher {
    /// Create a category searcher
    pub fn new(index: Arc<dyn FullTextIndex>, params: Bm25Params) -> Self {
        CategorySearcher { index, params }
    }
}

impl Searchable for CategorySearcher {
    fn search(&self, req: &SearchRequest<'_>) -> Result<SearchResponse> {
        facet_search(
            self.index.as_ref(),
            &self.params,
            EntityKind::Category,
            &req.compiled.text,
            req.limit,
            |entity| matches!(entity, EntityRef::Category(id) if req.scope.allows_category(*id)),
        )
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Category
    }
}
