//! Tier 2: Filter Grammar
//!
//! Each filter restricts the candidate set the way its grammar says, and
//! combined filters intersect. Filter-only queries list every match in id
//! order.

use super::test_utils::*;
use agora::{
    Category, CategoryId, Identity, Post, SearchConfig, SearchEngine, Tag, TagId, TopicId, User,
    UserId,
};
use chrono::Duration;

const DINNER: CategoryId = CategoryId(2);
const BRUNCH: CategoryId = CategoryId(3);

/// Five topics, ten days apart:
///
/// | topic | category | tags                     | notes                  |
/// |-------|----------|--------------------------|------------------------|
/// | 1     | general  | eggs                     |                        |
/// | 2     | general  | lunch                    | closed, reply by chef  |
/// | 3     | general  | lunch, eggs, sandwiches  | 100 views              |
/// | 4     | dinner   |                          |                        |
/// | 5     | brunch   |                          | brunch under general   |
fn engine() -> SearchEngine {
    let forum = Forum::new();
    for (id, name) in [(1, "eggs"), (2, "lunch"), (3, "sandwiches")] {
        forum.catalog.upsert_tag(Tag::new(TagId(id), name));
    }
    forum
        .catalog
        .upsert_category(Category::new(DINNER, "Dinner", "dinner"));
    forum
        .catalog
        .upsert_category(Category::new(BRUNCH, "Brunch", "brunch").with_parent(GENERAL));
    forum.catalog.upsert_user(User::new(UserId(2), "chef"));

    let omelette = forum.topic(1, "Omelette basics", "fold the omelette gently", 0);
    forum.update_topic(omelette.with_tags(["eggs"]));

    let mut club = forum.topic(2, "Club sandwich", "no omelette here just bread", 10);
    club.closed = true;
    forum.update_topic(club.with_tags(["lunch"]));
    forum.catalog.upsert_post(
        Post::new(post_id(2, 2), TopicId(2), 2, UserId(2), "extra mayonnaise")
            .with_created_at(base_time() + Duration::days(11)),
    );

    let salad = forum.topic(3, "Egg salad sandwich", "boiled eggs and mayonnaise", 20);
    forum.update_topic(
        salad
            .with_tags(["lunch", "eggs", "sandwiches"])
            .with_views(100),
    );

    let roast = forum.topic(4, "Roast dinner", "slow roast potatoes", 30);
    forum.update_topic(roast.with_category(DINNER));

    let pancakes = forum.topic(5, "Pancake stack", "maple syrup pancakes", 40);
    forum.update_topic(pancakes.with_category(BRUNCH));

    forum.engine(SearchConfig::default())
}

fn run(engine: &SearchEngine, term: &str) -> Vec<u64> {
    let results = engine.execute(term, &topic_search(Identity::Anonymous)).unwrap();
    assert!(!results.invalid, "{:?} should be valid", term);
    topic_ids(&results)
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_tier2_tags_any() {
    let engine = engine();
    assert_eq!(run(&engine, "tags:eggs,lunch"), vec![1, 2, 3]);
}

#[test]
fn test_tier2_tags_all() {
    let engine = engine();
    assert_eq!(run(&engine, "tags:lunch+eggs+sandwiches"), vec![3]);
    assert_eq!(run(&engine, "tags:lunch+eggs"), vec![3]);
}

#[test]
fn test_tier2_negated_tags() {
    let engine = engine();
    assert_eq!(run(&engine, "tags:eggs -tags:lunch"), vec![1]);
}

#[test]
fn test_tier2_hash_falls_back_to_tag() {
    let engine = engine();
    assert_eq!(run(&engine, "#lunch"), vec![2, 3]);
}

#[test]
fn test_tier2_tagged_and_untagged() {
    let engine = engine();
    assert_eq!(run(&engine, "in:tagged"), vec![1, 2, 3]);
    assert_eq!(run(&engine, "in:untagged"), vec![4, 5]);
}

// ============================================================================
// Categories
// ============================================================================

#[test]
fn test_tier2_category_includes_subcategories() {
    let engine = engine();
    assert_eq!(run(&engine, "#general"), vec![1, 2, 3, 5]);
    assert_eq!(run(&engine, "category:dinner"), vec![4]);
}

#[test]
fn test_tier2_exact_category() {
    let engine = engine();
    assert_eq!(run(&engine, "category:=general"), vec![1, 2, 3]);
}

#[test]
fn test_tier2_parent_child_slug() {
    let engine = engine();
    assert_eq!(run(&engine, "#general:brunch"), vec![5]);
    assert_eq!(run(&engine, "#brunch"), vec![5]);
}

// ============================================================================
// Users
// ============================================================================

#[test]
fn test_tier2_post_author() {
    let engine = engine();
    assert_eq!(run(&engine, "@chef"), vec![2]);
    assert_eq!(run(&engine, "user:chef"), vec![2]);
    assert_eq!(run(&engine, "user:2"), vec![2]);
}

#[test]
fn test_tier2_topic_creator() {
    let engine = engine();
    assert!(run(&engine, "created:@chef").is_empty());
    assert_eq!(run(&engine, "created:@author"), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_tier2_unknown_user_is_text() {
    let engine = engine();
    // `@nobody` stays free text and matches nothing
    assert!(run(&engine, "omelette @nobody").is_empty());
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn test_tier2_absolute_date_bounds() {
    let engine = engine();
    // base time is 2024-03-01
    assert_eq!(run(&engine, "before:2024-03-11"), vec![1]);
    assert_eq!(run(&engine, "after:2024-03-21"), vec![3, 4, 5]);
    assert_eq!(run(&engine, "after:2024-03-05 before:2024-03-15"), vec![2]);
}

#[test]
fn test_tier2_four_digits_is_a_year() {
    let engine = engine();
    assert!(run(&engine, "after:2025").is_empty());
    assert_eq!(run(&engine, "before:2025"), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_tier2_unparsable_date_is_text() {
    let engine = engine();
    assert!(run(&engine, "omelette before:someday").is_empty());
}

// ============================================================================
// Status and counts
// ============================================================================

#[test]
fn test_tier2_status() {
    let engine = engine();
    assert_eq!(run(&engine, "status:closed"), vec![2]);
    assert_eq!(run(&engine, "status:open"), vec![1, 3, 4, 5]);
    assert_eq!(run(&engine, "status:noreplies"), vec![1, 3, 4, 5]);
}

#[test]
fn test_tier2_counts() {
    let engine = engine();
    assert_eq!(run(&engine, "min_views:50"), vec![3]);
    assert_eq!(run(&engine, "max_views:50"), vec![1, 2, 4, 5]);
    assert_eq!(run(&engine, "min_posts:2"), vec![2]);
}

// ============================================================================
// Combinations
// ============================================================================

#[test]
fn test_tier2_text_and_filters_intersect() {
    let engine = engine();
    assert_eq!(run(&engine, "omelette"), vec![1, 2]);
    assert_eq!(run(&engine, "omelette in:title"), vec![1]);
    assert_eq!(run(&engine, "omelette status:closed"), vec![2]);
}

#[test]
fn test_tier2_unknown_filter_key_is_text() {
    let engine = engine();
    let results = engine
        .execute("color:red", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(!results.invalid);
    assert!(results.is_empty());
}
