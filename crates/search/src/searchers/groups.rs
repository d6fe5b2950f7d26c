//! Group search

use super::{facet_search, SearchRequest, SearchResponse, Searchable};
use agora_core::{EntityKind, EntityRef, Result};
use agora_store::{Bm25Params, Catalog, FullTextIndex};
use std::sync::Arc;

/// Searches group names and full names, honoring group visibility
pub struct GroupSearcher {
    catalog: Arc<Catalog>,
    index: Arc<dyn FullTextIndex>,
    params: Bm25Params,
}

impl GroupSearcher {
    /// Create a group searcher
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn FullTextIndex>, params: Bm25Params) -> Self {
        GroupSearcher {
            catalog,
            index,
            params,
        }
    }
}

impl Searchable for GroupSearcher {
    fn search(&self, req: &SearchRequest<'_>) -> Result<SearchResponse> {
        facet_search(
            self.index.as_ref(),
            &self.params,
            EntityKind::Group,
            &req.compiled.text,
            req.limit,
            |entity| match entity {
                EntityRef::Group(id) => self
                    .catalog
                    .group(*id)
                    .map_or(false, |group| req.scope.allows_group(&group)),
                _ => false,
            },
        )
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Group
    }
}
