//! Tier 5: Pagination
//!
//! Pages partition the ranked list; `more_full_page_results` is true
//! exactly when a later page has rows. Header searches return one capped
//! facet per kind and flag overflow per kind.

use super::test_utils::*;
use agora::{EntityRef, Identity, SearchConfig, SearchContext, SearchEngine, SearchOptions, TopicId};

fn engine(config: SearchConfig) -> SearchEngine {
    let forum = Forum::new();
    for id in 1..=5 {
        forum.topic(id, "Granola bars", "oats and honey granola", 0);
    }
    for n in 2..=4 {
        forum.reply(1, n, "more granola", 0);
    }
    forum.engine(config)
}

fn page(engine: &SearchEngine, page: u32) -> (Vec<u64>, bool) {
    let results = engine
        .execute("granola", &topic_search(Identity::Anonymous).with_page(page))
        .unwrap();
    assert_eq!(results.page, page);
    (topic_ids(&results), results.more_full_page_results)
}

// ============================================================================
// Full page
// ============================================================================

#[test]
fn test_tier5_pages_partition_results() {
    let engine = engine(SearchConfig::default().with_per_page(2));
    assert_eq!(page(&engine, 1), (vec![1, 2], true));
    assert_eq!(page(&engine, 2), (vec![3, 4], true));
    assert_eq!(page(&engine, 3), (vec![5], false));
    assert_eq!(page(&engine, 4), (vec![], false));
}

#[test]
fn test_tier5_exact_fit_has_no_more() {
    let engine = engine(SearchConfig::default().with_per_page(5));
    assert_eq!(page(&engine, 1), (vec![1, 2, 3, 4, 5], false));
}

#[test]
fn test_tier5_per_page_echoed() {
    let engine = engine(SearchConfig::default().with_per_page(2));
    let results = engine
        .execute("granola", &topic_search(Identity::Anonymous))
        .unwrap();
    assert_eq!(results.per_page, 2);
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn test_tier5_header_caps_each_facet() {
    let engine = engine(SearchConfig::default().with_per_facet(3));
    let results = engine.execute("granola", &SearchOptions::new()).unwrap();
    assert_eq!(topic_ids(&results), vec![1, 2, 3]);
    assert!(results.more_posts);
    assert!(results.more_full_page_results);
    assert!(results.categories.is_empty());
    assert!(!results.more_categories);
}

#[test]
fn test_tier5_header_ignores_page() {
    let engine = engine(SearchConfig::default().with_per_facet(3));
    let results = engine
        .execute("granola", &SearchOptions::new().with_page(2))
        .unwrap();
    assert_eq!(topic_ids(&results), vec![1, 2, 3]);
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_tier5_topic_context_pages_posts() {
    let engine = engine(SearchConfig::default().with_per_page(3));
    let options = SearchOptions::new()
        .with_context(SearchContext::Topic(TopicId(1)))
        .with_skip_cache();

    let first = engine.execute("granola", &options).unwrap();
    assert_eq!(
        post_refs(&first),
        (1..=3).map(|n| EntityRef::post(post_id(1, n))).collect::<Vec<_>>()
    );
    assert!(first.more_full_page_results);

    let second = engine.execute("granola", &options.with_page(2)).unwrap();
    assert_eq!(post_refs(&second), vec![EntityRef::post(post_id(1, 4))]);
    assert!(!second.more_full_page_results);
}
