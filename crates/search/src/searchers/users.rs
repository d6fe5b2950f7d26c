//! User search

use super::{facet_search, SearchRequest, SearchResponse, Searchable};
use agora_core::{EntityKind, EntityRef, Result};
use agora_store::{Bm25Params, Catalog, FullTextIndex};
use std::sync::Arc;

/// Searches usernames and display names
///
/// Suspended, inactive and staged users only show up for staff.
pub struct UserSearcher {
    catalog: Arc<Catalog>,
    index: Arc<dyn FullTextIndex>,
    params: Bm25Params,
}

impl UserSearcher {
    /// Create a user searcher
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn FullTextIndex>, params: Bm25Params) -> Self {
        UserSearcher {
            catalog,
            index,
            params,
        }
    }
}

impl Searchable for UserSearcher {
    fn search(&self, req: &SearchRequest<'_>) -> Result<SearchResponse> {
        facet_search(
            self.index.as_ref(),
            &self.params,
            EntityKind::User,
            &req.compiled.text,
            req.limit,
            |entity| match entity {
                EntityRef::User(id) => self
                    .catalog
                    .user(*id)
                    .map_or(false, |user| req.scope.allows_user(&user)),
                _ => false,
            },
        )
    }

    fn kind(&self) -> EntityKind {
        EntityKind::User
    }
}
