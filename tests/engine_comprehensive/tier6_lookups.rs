//! Tier 6: Direct Lookups and CJK
//!
//! Ids and forum URLs resolve straight to a post, still subject to
//! visibility. CJK input is segmented and validated against the CJK
//! minimum length.

use super::test_utils::*;
use agora::{
    Category, CategoryId, EntityRef, GroupId, Identity, Locale, PermissionType, SearchConfig,
    SearchEngine, SearchOptions,
};

const BASE_URL: &str = "https://forum.example.com";

fn engine() -> SearchEngine {
    let forum = Forum::new();
    forum.topic(1, "Ramen shops", "東京のラーメン", 0);
    forum.topic(2, "Dumplings", "steamed or fried", 0);
    forum.topic(3, "Noodle thread", "hand pulled noodles", 0);
    forum.reply(3, 2, "wide noodles please", 1);

    forum.catalog.upsert_category(
        Category::new(CategoryId(2), "Hidden", "hidden")
            .with_group_permission(GroupId(9), PermissionType::Full),
    );
    let hidden = forum.topic(4, "Hidden recipe", "secret broth", 0);
    forum.update_topic(hidden.with_category(CategoryId(2)));

    forum.engine(SearchConfig::default().with_base_url(BASE_URL))
}

fn lookup(engine: &SearchEngine, term: &str, options: &SearchOptions) -> Vec<EntityRef> {
    let results = engine.execute(term, options).unwrap();
    assert!(!results.invalid, "{:?} should be valid", term);
    post_refs(&results)
}

// ============================================================================
// Ids
// ============================================================================

#[test]
fn test_tier6_search_for_id() {
    let engine = engine();
    let options = topic_search(Identity::Anonymous).with_search_for_id();
    assert_eq!(lookup(&engine, "2", &options), vec![EntityRef::post(post_id(2, 1))]);
}

#[test]
fn test_tier6_bare_number_without_id_search() {
    let engine = engine();
    let results = engine
        .execute("2", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(results.invalid);
}

// ============================================================================
// URLs
// ============================================================================

#[test]
fn test_tier6_topic_url_with_post_number() {
    let engine = engine();
    let options = topic_search(Identity::Anonymous);
    let url = format!("{}/t/noodle-thread/3/2", BASE_URL);
    assert_eq!(lookup(&engine, &url, &options), vec![EntityRef::post(post_id(3, 2))]);
}

#[test]
fn test_tier6_relative_urls() {
    let engine = engine();
    let options = topic_search(Identity::Anonymous);
    assert_eq!(lookup(&engine, "/t/3", &options), vec![EntityRef::post(post_id(3, 1))]);
    // Missing post numbers fall back to the first post
    assert_eq!(lookup(&engine, "/t/3/99", &options), vec![EntityRef::post(post_id(3, 1))]);
    let by_post = format!("/p/{}", post_id(2, 1).get());
    assert_eq!(lookup(&engine, &by_post, &options), vec![EntityRef::post(post_id(2, 1))]);
}

#[test]
fn test_tier6_foreign_host_is_text() {
    let engine = engine();
    let options = topic_search(Identity::Anonymous);
    assert!(lookup(&engine, "https://elsewhere.example.org/t/3", &options).is_empty());
}

#[test]
fn test_tier6_lookup_respects_visibility() {
    let engine = engine();
    let options = topic_search(Identity::Anonymous).with_search_for_id();
    assert!(lookup(&engine, "4", &options).is_empty());
    assert!(lookup(&engine, "/t/hidden-recipe/4", &options).is_empty());
}

// ============================================================================
// CJK
// ============================================================================

#[test]
fn test_tier6_cjk_detected_from_term() {
    let engine = engine();
    let results = engine
        .execute("東京", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(!results.invalid);
    assert_eq!(topic_ids(&results), vec![1]);
}

#[test]
fn test_tier6_cjk_locale() {
    let engine = engine();
    let options = topic_search(Identity::Anonymous).with_locale(Locale::Japanese);
    assert_eq!(lookup(&engine, "ラーメン", &options), vec![EntityRef::post(post_id(1, 1))]);
}

#[test]
fn test_tier6_segmentation_can_be_disabled() {
    let engine = engine();
    let mut options = topic_search(Identity::Anonymous);
    options.cjk_segmentation = Some(false);
    let results = engine.execute("東京", &options).unwrap();
    assert!(results.invalid);
}
