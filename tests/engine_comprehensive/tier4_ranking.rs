//! Tier 4: Ranking
//!
//! Relevance is field-weighted text score times structural weight; an
//! explicit order replaces relevance entirely.

use super::test_utils::*;
use agora::{Category, CategoryId, Identity, Post, SearchConfig, SearchPriority, TopicId, UserId};

fn ranked_topics(term: &str, forum: &Forum) -> Vec<u64> {
    let engine = forum.engine(SearchConfig::default());
    topic_ids(&engine.execute(term, &topic_search(Identity::Anonymous)).unwrap())
}

/// Two topics with identical text, created a day apart
fn twins() -> Forum {
    let forum = Forum::new();
    forum.topic(1, "Kettle descaling", "vinegar works well", 0);
    forum.topic(2, "Kettle descaling", "vinegar works well", 1);
    forum
}

// ============================================================================
// Relevance
// ============================================================================

#[test]
fn test_tier4_title_beats_body_stuffing() {
    let forum = Forum::new();
    forum.topic(1, "Sourdough starter", "feed the sourdough daily", 0);
    forum.topic(2, "Bread notes", &"sourdough ".repeat(20), 0);
    assert_eq!(ranked_topics("sourdough", &forum), vec![1, 2]);
}

#[test]
fn test_tier4_identical_text_ties_break_by_id() {
    assert_eq!(ranked_topics("kettle", &twins()), vec![1, 2]);
}

#[test]
fn test_tier4_closed_topics_rank_lower() {
    let forum = twins();
    let mut first = forum.catalog.topic(TopicId(1)).unwrap();
    first.closed = true;
    forum.update_topic(first);
    assert_eq!(ranked_topics("kettle", &forum), vec![2, 1]);
}

#[test]
fn test_tier4_pinned_topics_rank_higher() {
    let forum = twins();
    let mut second = forum.catalog.topic(TopicId(2)).unwrap();
    second.pinned = true;
    forum.update_topic(second);
    assert_eq!(ranked_topics("kettle", &forum), vec![2, 1]);
    // The bonus is a relevance factor only
    assert_eq!(ranked_topics("kettle order:oldest", &forum), vec![1, 2]);
}

#[test]
fn test_tier4_category_priority() {
    let forum = twins();
    forum.catalog.upsert_category(
        Category::new(CategoryId(2), "Attic", "attic").with_search_priority(SearchPriority::Low),
    );
    let first = forum.catalog.topic(TopicId(1)).unwrap();
    forum.update_topic(first.with_category(CategoryId(2)));
    assert_eq!(ranked_topics("kettle", &forum), vec![2, 1]);
}

#[test]
fn test_tier4_ignored_category_needs_naming() {
    let forum = twins();
    forum.catalog.upsert_category(
        Category::new(CategoryId(2), "Attic", "attic")
            .with_search_priority(SearchPriority::Ignore),
    );
    let first = forum.catalog.topic(TopicId(1)).unwrap();
    forum.update_topic(first.with_category(CategoryId(2)));
    assert_eq!(ranked_topics("kettle", &forum), vec![2]);
    assert_eq!(ranked_topics("kettle #attic", &forum), vec![1]);
}

// ============================================================================
// Explicit orders
// ============================================================================

fn dated() -> Forum {
    let forum = Forum::new();
    for (id, day) in [(1, 3), (2, 0), (3, 2), (4, 1)] {
        forum.topic(id, &format!("Bread {}", id), "crusty bread", day);
    }
    forum
}

#[test]
fn test_tier4_latest_is_newest_first() {
    let forum = dated();
    assert_eq!(ranked_topics("bread order:latest", &forum), vec![1, 3, 4, 2]);
    assert_eq!(ranked_topics("bread l", &forum), vec![1, 3, 4, 2]);
}

#[test]
fn test_tier4_oldest_is_oldest_first() {
    assert_eq!(ranked_topics("bread order:oldest", &dated()), vec![2, 4, 3, 1]);
}

#[test]
fn test_tier4_latest_uses_latest_reply() {
    let forum = dated();
    forum.reply(2, 2, "more bread", 10);
    assert_eq!(ranked_topics("bread order:latest", &forum), vec![2, 1, 3, 4]);
    assert_eq!(
        ranked_topics("bread order:latest_topic", &forum),
        vec![1, 3, 4, 2]
    );
}

#[test]
fn test_tier4_views_and_likes() {
    let forum = dated();
    for (id, views) in [(1, 5), (2, 500), (3, 50), (4, 0)] {
        let topic = forum.catalog.topic(TopicId(id)).unwrap();
        forum.update_topic(topic.with_views(views));
    }
    assert_eq!(ranked_topics("bread order:views", &forum), vec![2, 3, 1, 4]);

    forum.catalog.upsert_post(
        Post::new(post_id(4, 1), TopicId(4), 1, UserId(1), "crusty bread").with_likes(9),
    );
    assert_eq!(ranked_topics("bread order:likes", &forum)[0], 4);
}

#[test]
fn test_tier4_order_is_stable_across_runs() {
    let forum = dated();
    let engine = forum.engine(SearchConfig::default());
    let options = topic_search(Identity::Anonymous);
    let first = engine.execute("bread", &options).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.execute("bread", &options).unwrap().posts, first.posts);
    }
}
