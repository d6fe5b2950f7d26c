//! Tag search

use super::{facet_search, SearchRequest, SearchResponse, Searchable};
use agora_core::{EntityKind, EntityRef, Result};
use agora_store::{Bm25Params, Catalog, FullTextIndex};
use std::sync::Arc;

/// Searches tag names; staff-only tags are hidden from everyone else
pub struct TagSearcher {
    catalog: Arc<Catalog>,
    index: Arc<dyn FullTextIndex>,
    params: Bm25Params,
}

impl TagSearcher {
    /// Create a tag searcher
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn FullTextIndex>, params: Bm25Params) -> Self {
        TagSearcher {
            catalog,
            index,
            params,
        }
    }
}

impl Searchable for TagSearcher {
    fn search(&self, req: &SearchRequest<'_>) -> Result<SearchResponse> {
        facet_search(
            self.index.as_ref(),
            &self.params,
            EntityKind::Tag,
            &req.compiled.text,
            req.limit,
            |entity| match entity {
                EntityRef::Tag(id) => self
                    .catalog
                    .tag(*id)
                    .map_or(false, |tag| req.scope.allows_tag(&tag)),
                _ => false,
            },
        )
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Tag
    }
}
