//! Tier 1: Query Validation
//!
//! Too-short and empty queries are reported through a flagged empty
//! result set, never an error. Quoted phrases are exempt from the length
//! gate, and normalization is idempotent.

use super::test_utils::*;
use agora::{normalize, Identity, SearchConfig};
use proptest::prelude::*;

fn forum() -> Forum {
    let forum = Forum::new();
    forum.topic(1, "Evil trout", "the evil trout lurks in the pond", 0);
    forum.topic(2, "Letters", "a b c d are the first letters", 1);
    forum
}

// ============================================================================
// Minimum length
// ============================================================================

#[test]
fn test_tier1_short_term_is_invalid() {
    let engine = forum().engine(SearchConfig::default().with_min_search_term_length(5));
    let results = engine.execute("evil", &topic_search(Identity::Anonymous)).unwrap();
    assert!(results.invalid);
    assert_eq!(results.term, "");
    assert!(results.is_empty());
}

#[test]
fn test_tier1_one_long_term_makes_query_valid() {
    let engine = forum().engine(SearchConfig::default().with_min_search_term_length(5));
    let results = engine
        .execute("evil trout", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(!results.invalid);
    assert_eq!(results.term, "evil trout");
    assert_eq!(topic_ids(&results), vec![1]);
}

#[test]
fn test_tier1_quoted_phrase_ignores_min_length() {
    let engine = forum().engine(SearchConfig::default().with_min_search_term_length(5));
    let results = engine
        .execute("\"a b c d\"", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(!results.invalid);
    assert_eq!(topic_ids(&results), vec![2]);
}

#[test]
fn test_tier1_request_override_wins() {
    let engine = forum().engine(SearchConfig::default().with_min_search_term_length(5));
    let results = engine
        .execute(
            "evil",
            &topic_search(Identity::Anonymous).with_min_search_term_length(2),
        )
        .unwrap();
    assert!(!results.invalid);
    assert_eq!(topic_ids(&results), vec![1]);
}

#[test]
fn test_tier1_empty_and_whitespace_are_invalid() {
    let engine = forum().engine(SearchConfig::default());
    for term in ["", "   ", "\u{200B}\u{FEFF}"] {
        let results = engine.execute(term, &topic_search(Identity::Anonymous)).unwrap();
        assert!(results.invalid, "{:?} should be invalid", term);
    }
}

#[test]
fn test_tier1_filter_only_query_is_valid() {
    let engine = forum().engine(SearchConfig::default());
    let results = engine
        .execute("order:latest", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(!results.invalid);
    assert_eq!(topic_ids(&results), vec![2, 1]);
}

#[test]
fn test_tier1_punctuation_only_is_invalid() {
    let engine = forum().engine(SearchConfig::default());
    for term in ["?????", "\"...\"", "(((***)))", "'!!!'"] {
        let results = engine.execute(term, &topic_search(Identity::Anonymous)).unwrap();
        assert!(results.invalid, "{:?} should be invalid", term);
        assert!(results.is_empty(), "{:?} should find nothing", term);
    }
}

#[test]
fn test_tier1_punctuation_does_not_pad_short_terms() {
    let engine = forum().engine(SearchConfig::default().with_min_search_term_length(5));
    let results = engine
        .execute("evil!!!", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(results.invalid);
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_tier1_normalization_trims_and_strips() {
    assert_eq!(normalize(Some("  evil\u{200B} trout \n")), "evil trout");
    assert_eq!(normalize(None), "");
}

proptest! {
    #[test]
    fn test_tier1_normalization_is_idempotent(input in "\\PC{0,40}") {
        let once = normalize(Some(&input));
        prop_assert_eq!(normalize(Some(&once)), once.clone());
    }
}
