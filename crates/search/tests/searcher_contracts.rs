//! Searcher contract tests
//!
//! Every searcher returns at most `limit` rows, best first, with the same
//! order on every run over the same data. Header search fills one capped
//! facet per kind and flags overflow.

use agora_core::{
    Category, CategoryId, EntityKind, EntityRef, Group, GroupId, GroupVisibility, Identity,
    Post, PostId, ResultSet, SearchContext, SearchOptions, Tag, TagId, Topic, TopicId,
    TypeFilter, User, UserId,
};
use agora_search::{SearchConfig, SearchEngine};
use agora_store::{Catalog, InvertedIndex};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn engine(config: SearchConfig) -> SearchEngine {
    let catalog = Arc::new(Catalog::new());
    catalog.upsert_category(
        Category::new(CategoryId(1), "Cooking", "cooking").with_description("cooking recipes"),
    );
    catalog.upsert_tag(Tag::new(TagId(1), "cooking-tips"));
    catalog.upsert_group(Group::new(GroupId(1), "cooking-club"));
    catalog.upsert_group(
        Group::new(GroupId(2), "cooking-staff").with_visibility(GroupVisibility::Staff),
    );
    catalog.upsert_user(User::new(UserId(1), "cookingfan"));
    catalog.upsert_user(User::admin(UserId(2), "admin"));

    for n in 1..=8u64 {
        catalog.upsert_topic(
            Topic::new(TopicId(n), format!("Cooking question {}", n), UserId(1))
                .with_category(CategoryId(1)),
        );
        catalog.upsert_post(Post::new(
            PostId(n * 10),
            TopicId(n),
            1,
            UserId(1),
            "first post about cooking",
        ));
        catalog.upsert_post(Post::new(
            PostId(n * 10 + 1),
            TopicId(n),
            2,
            UserId(1),
            "reply about cooking",
        ));
    }

    let engine = SearchEngine::new(catalog, Arc::new(InvertedIndex::new()), config);
    engine.indexer().rebuild().unwrap();
    engine
}

fn refs(results: &ResultSet, kind: EntityKind) -> Vec<EntityRef> {
    results.hits(kind).iter().map(|h| h.entity_ref).collect()
}

// ============================================================================
// Header search
// ============================================================================

#[test]
fn test_header_search_fills_every_facet() {
    let engine = engine(SearchConfig::default().with_per_facet(3));
    let results = engine.execute("cooking", &SearchOptions::new()).unwrap();

    assert_eq!(results.posts.len(), 3);
    assert!(results.more_posts);
    assert!(results.more_full_page_results);
    assert_eq!(refs(&results, EntityKind::Category), vec![EntityRef::category(CategoryId(1))]);
    assert_eq!(refs(&results, EntityKind::Tag), vec![EntityRef::tag(TagId(1))]);
    assert_eq!(refs(&results, EntityKind::User), vec![EntityRef::user(UserId(1))]);
    assert!(!results.more_users);
}

#[test]
fn test_header_search_groups_posts_by_topic() {
    let engine = engine(SearchConfig::default().with_per_facet(10));
    let results = engine.execute("cooking", &SearchOptions::new()).unwrap();

    let mut topics: Vec<TopicId> = results.posts.iter().filter_map(|h| h.topic_id).collect();
    let total = topics.len();
    topics.sort();
    topics.dedup();
    assert_eq!(topics.len(), total);
    assert_eq!(total, 8);
}

#[test]
fn test_staff_only_group_visible_to_staff_only() {
    let engine = engine(SearchConfig::default());
    let anon = engine
        .execute("cooking", &SearchOptions::new().with_type_filter(TypeFilter::Group))
        .unwrap();
    assert_eq!(refs(&anon, EntityKind::Group), vec![EntityRef::group(GroupId(1))]);

    let admin = engine
        .execute(
            "cooking",
            &SearchOptions::new()
                .with_type_filter(TypeFilter::Group)
                .with_identity(Identity::User(UserId(2))),
        )
        .unwrap();
    assert_eq!(refs(&admin, EntityKind::Group).len(), 2);
}

// ============================================================================
// Full page and context search
// ============================================================================

#[test]
fn test_full_page_respects_per_page() {
    let engine = engine(SearchConfig::default().with_per_page(5));
    let opts = SearchOptions::new().with_type_filter(TypeFilter::Topic);

    let first = engine.execute("cooking", &opts).unwrap();
    assert_eq!(first.posts.len(), 5);
    assert!(first.more_full_page_results);

    let second = engine.execute("cooking", &opts.clone().with_page(2)).unwrap();
    assert_eq!(second.posts.len(), 3);
    assert!(!second.more_full_page_results);

    let mut all = first.post_refs();
    all.extend(second.post_refs());
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 8);
}

#[test]
fn test_page_is_clamped_to_max_page() {
    let mut config = SearchConfig::default().with_per_page(5);
    config.query.max_page = 2;
    let engine = engine(config);
    let results = engine
        .execute(
            "cooking",
            &SearchOptions::new()
                .with_type_filter(TypeFilter::Topic)
                .with_page(50),
        )
        .unwrap();
    assert_eq!(results.page, 2);
    assert_eq!(results.posts.len(), 3);
}

#[test]
fn test_topic_context_returns_all_posts_in_order() {
    let engine = engine(SearchConfig::default());
    let results = engine
        .execute(
            "cooking",
            &SearchOptions::new().with_context(SearchContext::Topic(TopicId(3))),
        )
        .unwrap();
    assert_eq!(
        results.post_refs(),
        vec![EntityRef::post(PostId(30)), EntityRef::post(PostId(31))]
    );
    assert!(results.users.is_empty());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeated_execution_is_identical() {
    let engine = engine(SearchConfig::default());
    let opts = SearchOptions::new()
        .with_type_filter(TypeFilter::Topic)
        .with_skip_cache();

    let first = engine.execute("cooking reply", &opts).unwrap();
    for _ in 0..10 {
        let again = engine.execute("cooking reply", &opts).unwrap();
        assert_eq!(again.posts, first.posts);
    }
}

#[test]
fn test_equal_scores_break_ties_by_id() {
    let engine = engine(SearchConfig::default().with_per_page(50));
    let results = engine
        .execute(
            "first",
            &SearchOptions::new().with_type_filter(TypeFilter::Topic),
        )
        .unwrap();
    let ids: Vec<EntityRef> = results.post_refs();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn test_results_serialize_to_json() {
    let engine = engine(SearchConfig::default());
    let results = engine
        .execute(
            "cooking",
            &SearchOptions::new().with_type_filter(TypeFilter::Topic),
        )
        .unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["term"], "cooking");
    assert_eq!(json["invalid"], false);
    assert!(json["posts"].is_array());
}
