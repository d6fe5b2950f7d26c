//! Post search
//!
//! Candidate flow:
//!
//! ```text
//! index hits (or every post for filter-only queries; free text that
//!   compiled to nothing lists nothing unless filters or a context scope it)
//!   → catalog lookup (hits whose post or topic vanished are skipped)
//!   → predicates (visibility first)
//!   → ranker
//!   → optional one-post-per-topic grouping
//!   → limit
//! ```

use super::{SearchRequest, SearchResponse, Searchable};
use crate::compiler::{DirectLookup, EvalEnv};
use crate::config::RankingConfig;
use crate::ranker::{PostCandidate, Ranker};
use crate::visibility::VisibilityScope;
use agora_core::{EntityKind, EntityRef, Post, RankedCandidate, Result, SearchContext};
use agora_store::{Catalog, FullTextIndex};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::debug;

/// Searches posts
pub struct PostSearcher {
    catalog: Arc<Catalog>,
    index: Arc<dyn FullTextIndex>,
    ranking: RankingConfig,
}

impl PostSearcher {
    /// Create a post searcher
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn FullTextIndex>, ranking: RankingConfig) -> Self {
        PostSearcher {
            catalog,
            index,
            ranking,
        }
    }

    /// `(post, text score)` pairs to consider
    fn candidates(&self, req: &SearchRequest<'_>) -> Result<Vec<(Post, f32)>> {
        let text = &req.compiled.text;
        if !text.is_empty() {
            let query = text
                .to_index_query()
                .with_kinds(vec![EntityKind::Post])
                .with_params(self.ranking.bm25_params());
            let hits = self.index.query(&query)?;
            return Ok(hits
                .into_iter()
                .filter_map(|hit| match hit.entity {
                    EntityRef::Post(id) => self.catalog.post(id).map(|p| (p, hit.score)),
                    _ => None,
                })
                .collect());
        }
        if req.query.has_free_text() && !req.query.is_scoped() {
            debug!("free text compiled to no terms, nothing to list");
            return Ok(vec![]);
        }
        let posts = match &req.query.context {
            Some(SearchContext::Topic(topic_id)) => self
                .catalog
                .topic_post_ids(*topic_id)
                .into_iter()
                .filter_map(|id| self.catalog.post(id))
                .collect(),
            _ => self.catalog.posts(),
        };
        Ok(posts.into_iter().map(|p| (p, 0.0)).collect())
    }

    /// Resolve an id or URL lookup, subject to visibility
    pub fn lookup(&self, direct: DirectLookup, scope: &VisibilityScope) -> Vec<RankedCandidate> {
        let post = match direct {
            DirectLookup::Post(id) => self.catalog.post(id),
            DirectLookup::Topic { id, post_number } => post_number
                .and_then(|n| self.catalog.post_by_number(id, n))
                .or_else(|| self.catalog.post_by_number(id, 1)),
        };
        let Some(post) = post else {
            return vec![];
        };
        let Some(topic) = self.catalog.topic(post.topic_id) else {
            return vec![];
        };
        if !scope.allows_post(&post, &topic) {
            debug!(post = %post.id, "direct lookup hidden by scope");
            return vec![];
        }
        let category = topic.category_id.and_then(|id| self.catalog.category(id));
        vec![PostCandidate::new(post, topic, category, 0.0).to_ranked()]
    }
}

impl Searchable for PostSearcher {
    fn search(&self, req: &SearchRequest<'_>) -> Result<SearchResponse> {
        if req.compiled.matches_nothing() || req.limit == 0 {
            return Ok(SearchResponse::empty());
        }
        let raw = self.candidates(req)?;
        let candidates_considered = raw.len();

        let env = EvalEnv {
            catalog: &self.catalog,
            scope: req.scope,
        };
        let matched: Vec<PostCandidate> = raw
            .into_iter()
            .filter_map(|(post, score)| {
                let topic = self.catalog.topic(post.topic_id)?;
                if !req.compiled.matches_post(&post, &topic, &env) {
                    return None;
                }
                let category = topic.category_id.and_then(|id| self.catalog.category(id));
                Some(PostCandidate::new(post, topic, category, score))
            })
            .collect();

        let ranked = Ranker::new(&self.ranking).rank(
            matched,
            req.compiled.order,
            req.query.context.as_ref(),
        );

        let mut seen_topics = FxHashSet::default();
        let hits: Vec<RankedCandidate> = ranked
            .iter()
            .filter(|c| !req.group_by_topic || seen_topics.insert(c.topic.id))
            .take(req.limit)
            .map(PostCandidate::to_ranked)
            .collect();

        debug!(
            considered = candidates_considered,
            returned = hits.len(),
            "post search"
        );
        Ok(SearchResponse {
            hits,
            candidates_considered,
        })
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Post
    }
}
