//! Search orchestrator
//!
//! ```text
//! term + SearchOptions
//!      │
//!      ▼
//! ┌──────────────────────────────────────────────┐
//! │                SearchEngine                  │
//! │  cache? ─▶ scope ─▶ parse ─▶ authorize        │
//! │        ─▶ compile ─▶ direct lookup?           │
//! │        ─▶ validate                            │
//! │                                               │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │      Search each kind (rayon)           │  │
//! │  │  ┌─────┐ ┌────┐ ┌────────┐ ┌───┐ ┌─────┐│  │
//! │  │  │Posts│ │User│ │Category│ │Tag│ │Group││  │
//! │  │  └──┬──┘ └─┬──┘ └───┬────┘ └─┬─┘ └──┬──┘│  │
//! │  └─────┼──────┼────────┼────────┼──────┼───┘  │
//! │        └──────┴────────┴────────┴──────┘      │
//! │                     │                         │
//! │            paginate + blurbs                  │
//! └─────────────────────┼─────────────────────────┘
//!                       ▼
//!                   ResultSet
//! ```
//!
//! The engine holds only `Arc` handles and configuration. Every execution
//! builds its own query, scope and result set; the anonymous cache is the
//! only state shared between requests.

use crate::blurb::blurb;
use crate::cache::{CacheKey, ResultCache};
use crate::compiler::{compile, CompiledQuery};
use crate::config::{SearchConfig, CONFIG_FILE_NAME};
use crate::query::{ExtractContext, Query};
use crate::searchers::{
    CategorySearcher, GroupSearcher, PostSearcher, SearchRequest, SearchResponse, Searchable,
    TagSearcher, UserSearcher,
};
use crate::validate::{min_term_length, validate};
use crate::visibility::{Guardian, ScopedLookup, VisibilityScope};
use agora_core::{EntityKind, Result, ResultSet, SearchError, SearchOptions, SearchStats};
use agora_store::{contains_cjk, Catalog, FullTextIndex, Indexer};
use chrono::Utc;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

// ============================================================================
// SearchEngine
// ============================================================================

/// Executes search requests against a catalog and its index
pub struct SearchEngine {
    catalog: Arc<Catalog>,
    index: Arc<dyn FullTextIndex>,
    config: SearchConfig,
    cache: Option<ResultCache>,
    posts: PostSearcher,
    users: UserSearcher,
    categories: CategorySearcher,
    tags: TagSearcher,
    groups: GroupSearcher,
}

impl SearchEngine {
    /// Create an engine
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn FullTextIndex>, config: SearchConfig) -> Self {
        let params = config.ranking.bm25_params();
        SearchEngine {
            posts: PostSearcher::new(catalog.clone(), index.clone(), config.ranking.clone()),
            users: UserSearcher::new(catalog.clone(), index.clone(), params),
            categories: CategorySearcher::new(index.clone(), params),
            tags: TagSearcher::new(catalog.clone(), index.clone(), params),
            groups: GroupSearcher::new(catalog.clone(), index.clone(), params),
            cache: config.execution.cache_ttl().map(ResultCache::new),
            catalog,
            index,
            config,
        }
    }

    /// Create an engine configured from `search.toml` in `dir`
    ///
    /// A commented default file is written first if none exists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be written, read or
    /// validated.
    pub fn open(
        catalog: Arc<Catalog>,
        index: Arc<dyn FullTextIndex>,
        dir: &Path,
    ) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        SearchConfig::write_default_if_missing(&path)?;
        let config = SearchConfig::from_file(&path)?;
        info!(path = %path.display(), "search config loaded");
        Ok(Self::new(catalog, index, config))
    }

    /// Active configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The catalog searched
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// An indexer writing into this engine's index
    pub fn indexer(&self) -> Indexer {
        Indexer::new(self.catalog.clone(), self.index.clone())
    }

    /// Drop every cached result
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run a search
    ///
    /// # Flow
    ///
    /// 1. Serve anonymous requests from the cache when possible
    /// 2. Resolve the identity's visibility scope
    /// 3. Parse the term, resolving filter values through the scope
    /// 4. Authorize private-message and staff-only requests
    /// 5. Compile; answer id and URL searches directly
    /// 6. Validate (an invalid query is an empty, flagged result)
    /// 7. Search each kind in parallel and paginate
    ///
    /// # Errors
    ///
    /// - `AccessDenied` for private-message scopes the identity may not see
    /// - `IndexUnavailable` once every retry attempt failed
    /// - `Timeout` when the wall-time budget is exceeded
    pub fn execute(&self, term: &str, options: &SearchOptions) -> Result<ResultSet> {
        let start = Instant::now();
        let page = options.effective_page().min(self.config.query.max_page);
        let page_size = self.page_size(options);

        let cache_key = match &self.cache {
            Some(_) if options.identity.is_anonymous() && !options.skip_cache => Some(
                CacheKey::new(term, options, self.catalog.version(), self.index.version()),
            ),
            _ => None,
        };
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(mut cached) = cache.get(key) {
                debug!(term, "served from cache");
                cached.stats.cached = true;
                return Ok(cached);
            }
        }

        let guardian = Guardian::new(&self.catalog, options.identity);
        let base = guardian.scope();
        let segment = options.cjk_segmentation.unwrap_or(
            self.config.query.cjk_segmentation && (options.locale.is_cjk() || contains_cjk(term)),
        );
        let ctx = ExtractContext {
            identity: options.identity,
            is_staff: base.is_staff,
            today: Utc::now().date_naive(),
        };
        let query = {
            let lookup = ScopedLookup::new(&self.catalog, &base);
            Query::parse(
                term,
                options.locale,
                options.type_filter,
                options.search_context.clone(),
                segment,
                &lookup,
                &ctx,
            )
        };
        let scope = guardian.authorize(base, options, &query.filters)?;
        let compiled = compile(&query, &scope, &self.catalog, &self.config.query, options);

        let kinds = self.kinds(options);
        let mut results = ResultSet::empty(query.clean_term.clone(), options.type_filter, page, page_size);

        if let Some(direct) = compiled.direct.filter(|_| kinds.contains(&EntityKind::Post)) {
            debug!(?direct, "direct lookup");
            results.posts = self.posts.lookup(direct, &scope);
        } else {
            let verdict = validate(&query, min_term_length(options, &self.config.query, query.segmented));
            if !verdict.is_valid() {
                debug!(term, ?verdict, "invalid query");
                return Ok(ResultSet::invalid(options.type_filter, page, page_size));
            }
            self.search_kinds(&query, &compiled, &scope, options, &kinds, page, &mut results)?;
        }

        self.check_budget(start)?;
        if options.include_blurbs {
            self.attach_blurbs(&compiled, &mut results);
        }
        results.stats.elapsed_micros = start.elapsed().as_micros() as u64;
        debug!(
            term,
            posts = results.posts.len(),
            elapsed_micros = results.stats.elapsed_micros,
            "search executed"
        );

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.insert(key, results.clone());
        }
        Ok(results)
    }

    /// Run every searcher and paginate their rows into `results`
    #[allow(clippy::too_many_arguments)]
    fn search_kinds(
        &self,
        query: &Query,
        compiled: &CompiledQuery,
        scope: &VisibilityScope,
        options: &SearchOptions,
        kinds: &[EntityKind],
        page: u32,
        results: &mut ResultSet,
    ) -> Result<()> {
        let header = self.is_header(options);
        let page_size = results.per_page;
        let offset = if header {
            0
        } else {
            (page as usize - 1) * page_size
        };
        let limit = offset + page_size + 1;
        let group_by_topic = options.search_context.is_none();

        let outcomes: Vec<(EntityKind, Result<SearchResponse>)> = kinds
            .par_iter()
            .map(|&kind| {
                let req = SearchRequest {
                    query,
                    compiled,
                    scope,
                    limit,
                    group_by_topic,
                };
                let searcher = self.searcher(kind);
                (kind, self.with_retry(kind, || searcher.search(&req)))
            })
            .collect();

        let mut stats = SearchStats::default();
        let dominant = options.type_filter.dominant_kind();
        for (kind, outcome) in outcomes {
            let response = outcome?;
            stats.add_kind_candidates(kind, response.candidates_considered);

            let more = response.hits.len() > offset + page_size;
            *results.hits_mut(kind) = response
                .hits
                .into_iter()
                .skip(offset)
                .take(page_size)
                .collect();
            results.set_more(kind, more);
            if kind == dominant {
                results.more_full_page_results = more;
            }
        }
        results.stats = stats;
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn is_header(&self, options: &SearchOptions) -> bool {
        options.type_filter.is_header() && options.search_context.is_none()
    }

    fn page_size(&self, options: &SearchOptions) -> usize {
        if self.is_header(options) {
            self.config.query.per_facet
        } else {
            self.config.query.per_page
        }
    }

    /// Kinds searched for a request; context searches are post-only
    fn kinds(&self, options: &SearchOptions) -> Vec<EntityKind> {
        if options.search_context.is_some() {
            vec![EntityKind::Post]
        } else {
            options.type_filter.kinds().to_vec()
        }
    }

    fn searcher(&self, kind: EntityKind) -> &dyn Searchable {
        match kind {
            EntityKind::Post | EntityKind::Topic => &self.posts,
            EntityKind::User => &self.users,
            EntityKind::Category => &self.categories,
            EntityKind::Tag => &self.tags,
            EntityKind::Group => &self.groups,
        }
    }

    /// Retry retriable failures up to the configured attempt count
    fn with_retry<T>(&self, kind: EntityKind, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.config.execution.index_retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if e.is_retriable() && attempt < attempts => {
                    warn!(?kind, attempt, error = %e, "index query failed, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn check_budget(&self, start: Instant) -> Result<()> {
        let Some(budget) = self.config.execution.max_wall_time() else {
            return Ok(());
        };
        let elapsed = start.elapsed();
        if elapsed > budget {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "search over budget");
            return Err(SearchError::Timeout {
                elapsed_ms: elapsed.as_millis() as u64,
                budget_ms: budget.as_millis() as u64,
            });
        }
        Ok(())
    }

    fn attach_blurbs(&self, compiled: &CompiledQuery, results: &mut ResultSet) {
        let terms = compiled.text.highlight_terms();
        for hit in &mut results.posts {
            if let Some(post) = hit.entity_ref.as_post().and_then(|id| self.catalog.post(id)) {
                hit.blurb = Some(blurb(&post.raw, &terms, self.config.query.blurb_length));
            }
        }
    }
}
