//! Ranking
//!
//! `final_score = text_score × structural_weight`, where the text score is
//! the index's field-weighted BM25 and the structural weight folds in:
//!
//! ```text
//! priority multiplier (category tier)
//!   × closed penalty      (closed topics)
//!   × archived penalty    (archived topics)
//!   × pinned bonus        (pinned topics, relevance order only)
//! ```
//!
//! An explicit `order:` replaces relevance with a sort on the named field,
//! with `text_score` then entity id as tie-breaks. Context searches without
//! an explicit order follow the container's natural order. Every ordering
//! ends in the entity id, so equal inputs always produce equal output.

use crate::config::RankingConfig;
use crate::query::OrderBy;
use agora_core::{Category, EntityRef, Post, RankedCandidate, SearchContext, Topic};
use std::cmp::Ordering;

/// A post that passed every predicate, with everything ranking needs
#[derive(Debug, Clone)]
pub struct PostCandidate {
    /// The post
    pub post: Post,
    /// Its topic
    pub topic: Topic,
    /// Its topic's category
    pub category: Option<Category>,
    /// Index score (0 for filter-only queries)
    pub text_score: f32,
    /// Structural weight, filled in by the ranker
    pub structural_weight: f32,
}

impl PostCandidate {
    /// Create an unweighted candidate
    pub fn new(post: Post, topic: Topic, category: Option<Category>, text_score: f32) -> Self {
        PostCandidate {
            post,
            topic,
            category,
            text_score,
            structural_weight: 1.0,
        }
    }

    /// Relevance score
    pub fn final_score(&self) -> f32 {
        self.text_score * self.structural_weight
    }

    /// Convert into a result row
    pub fn to_ranked(&self) -> RankedCandidate {
        RankedCandidate::new(
            EntityRef::post(self.post.id),
            self.text_score,
            self.structural_weight,
        )
        .with_position(self.topic.id, self.post.post_number)
    }
}

/// Orders post candidates
pub struct Ranker<'a> {
    config: &'a RankingConfig,
}

impl<'a> Ranker<'a> {
    /// Create a ranker
    pub fn new(config: &'a RankingConfig) -> Self {
        Ranker { config }
    }

    /// Structural weight of a topic
    pub fn structural_weight(
        &self,
        topic: &Topic,
        category: Option<&Category>,
        explicit_order: bool,
    ) -> f32 {
        let mut weight = category.map_or(1.0, |c| {
            self.config.priority_multiplier(c.search_priority)
        });
        if topic.closed {
            weight *= self.config.closed_penalty;
        }
        if topic.archived {
            weight *= self.config.archived_penalty;
        }
        if topic.pinned && !explicit_order {
            weight *= self.config.pinned_bonus;
        }
        weight
    }

    /// Weigh and sort candidates
    pub fn rank(
        &self,
        mut candidates: Vec<PostCandidate>,
        order: Option<OrderBy>,
        context: Option<&SearchContext>,
    ) -> Vec<PostCandidate> {
        for candidate in &mut candidates {
            candidate.structural_weight = self.structural_weight(
                &candidate.topic,
                candidate.category.as_ref(),
                order.is_some(),
            );
        }
        candidates.sort_by(|a, b| compare(a, b, order, context));
        candidates
    }
}

fn compare(
    a: &PostCandidate,
    b: &PostCandidate,
    order: Option<OrderBy>,
    context: Option<&SearchContext>,
) -> Ordering {
    let primary = match (order, context) {
        (Some(order), _) => by_order(a, b, order).then_with(|| by_text(a, b)),
        (None, Some(SearchContext::Topic(_))) => a.post.post_number.cmp(&b.post.post_number),
        (None, Some(SearchContext::Category(_) | SearchContext::Tag(_))) => a
            .topic
            .created_at
            .cmp(&b.topic.created_at)
            .then_with(|| a.topic.id.cmp(&b.topic.id))
            .then_with(|| a.post.post_number.cmp(&b.post.post_number)),
        (None, Some(SearchContext::UserProfile(_))) => b.post.created_at.cmp(&a.post.created_at),
        (None, None) => b
            .final_score()
            .total_cmp(&a.final_score())
            .then_with(|| by_text(a, b)),
    };
    primary.then_with(|| a.post.id.cmp(&b.post.id))
}

fn by_text(a: &PostCandidate, b: &PostCandidate) -> Ordering {
    b.text_score.total_cmp(&a.text_score)
}

fn by_order(a: &PostCandidate, b: &PostCandidate, order: OrderBy) -> Ordering {
    match order {
        OrderBy::Latest => b.post.created_at.cmp(&a.post.created_at),
        OrderBy::Oldest => a.post.created_at.cmp(&b.post.created_at),
        OrderBy::LatestTopic => b.topic.created_at.cmp(&a.topic.created_at),
        OrderBy::OldestTopic => a.topic.created_at.cmp(&b.topic.created_at),
        OrderBy::Views => b.topic.views.cmp(&a.topic.views),
        OrderBy::Likes => b.post.like_count.cmp(&a.post.like_count),
    }
}

/// Sort non-post rows: text score descending, then entity
pub fn sort_by_relevance(rows: &mut [RankedCandidate]) {
    rows.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then_with(|| a.entity_ref.cmp(&b.entity_ref))
    });
}
