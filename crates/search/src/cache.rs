//! Anonymous result cache
//!
//! Anonymous requests see the same results for the same input, so their
//! result sets are kept for a short TTL. Keys include the catalog and index
//! version watermarks: any write to either makes older entries unreachable,
//! and they are dropped on the next lookup or sweep.

use agora_core::{Archetype, Locale, ResultSet, SearchContext, SearchOptions, TypeFilter};
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Everything an anonymous result depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    term: String,
    type_filter: TypeFilter,
    context: Option<SearchContext>,
    include_blurbs: bool,
    page: u32,
    min_search_term_length: Option<usize>,
    search_for_id: bool,
    archetype: Option<Archetype>,
    locale: Locale,
    cjk_segmentation: Option<bool>,
    catalog_version: u64,
    index_version: u64,
}

impl CacheKey {
    /// Key for a request against the given data versions
    pub fn new(term: &str, options: &SearchOptions, catalog_version: u64, index_version: u64) -> Self {
        CacheKey {
            term: term.to_string(),
            type_filter: options.type_filter,
            context: options.search_context.clone(),
            include_blurbs: options.include_blurbs,
            page: options.effective_page(),
            min_search_term_length: options.min_search_term_length,
            search_for_id: options.search_for_id,
            archetype: options.restrict_to_archetype,
            locale: options.locale,
            cjk_segmentation: options.cjk_segmentation,
            catalog_version,
            index_version,
        }
    }
}

/// TTL cache of result sets
pub struct ResultCache {
    entries: DashMap<CacheKey, (Instant, ResultSet)>,
    ttl: Duration,
}

impl ResultCache {
    /// Create a cache with the given entry lifetime
    pub fn new(ttl: Duration) -> Self {
        ResultCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for `key`
    pub fn get(&self, key: &CacheKey) -> Option<ResultSet> {
        let ttl = self.ttl;
        let fresh = self
            .entries
            .get(key)
            .filter(|entry| entry.0.elapsed() < ttl)
            .map(|entry| entry.1.clone());
        if fresh.is_none() {
            self.entries
                .remove_if(key, |_, (stored_at, _)| stored_at.elapsed() >= ttl);
        }
        fresh
    }

    /// Store a result set
    pub fn insert(&self, key: CacheKey, results: ResultSet) {
        self.entries.insert(key, (Instant::now(), results));
    }

    /// Drop expired entries
    pub fn sweep(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
