//! Tier 7: Failures and Configuration
//!
//! An unavailable index surfaces as a retriable error; configuration
//! problems surface as `InvalidConfig` before any search runs.

use super::test_utils::*;
use agora::{
    Catalog, Identity, InvertedIndex, SearchConfig, SearchEngine, SearchError, SearchOptions,
    TypeFilter,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn forum() -> Forum {
    let forum = Forum::new();
    forum.topic(1, "Waffle irons", "cast iron waffles", 0);
    forum
}

// ============================================================================
// Index availability
// ============================================================================

#[test]
fn test_tier7_disabled_index_is_unavailable() {
    let forum = forum();
    let index = Arc::new(InvertedIndex::new());
    let engine = SearchEngine::new(forum.catalog.clone(), index.clone(), SearchConfig::default());
    engine.indexer().rebuild().unwrap();

    index.disable();
    let err = engine
        .execute("waffles", &topic_search(Identity::Anonymous))
        .unwrap_err();
    assert!(matches!(err, SearchError::IndexUnavailable { .. }));
    assert!(err.is_retriable());

    index.enable();
    let results = engine
        .execute("waffles", &topic_search(Identity::Anonymous))
        .unwrap();
    assert_eq!(topic_ids(&results), vec![1]);
}

#[test]
fn test_tier7_invalid_query_never_reaches_index() {
    let forum = forum();
    let index = Arc::new(InvertedIndex::new());
    let engine = SearchEngine::new(forum.catalog.clone(), index.clone(), SearchConfig::default());
    index.disable();

    let results = engine
        .execute("wa", &topic_search(Identity::Anonymous))
        .unwrap();
    assert!(results.invalid);
}

#[test]
fn test_tier7_errors_are_not_cached() {
    let forum = forum();
    let index = Arc::new(InvertedIndex::new());
    let engine = SearchEngine::new(forum.catalog.clone(), index.clone(), SearchConfig::default());
    engine.indexer().rebuild().unwrap();
    let options = SearchOptions::new().with_type_filter(TypeFilter::Topic);

    index.disable();
    assert!(engine.execute("waffles", &options).is_err());
    index.enable();
    let results = engine.execute("waffles", &options).unwrap();
    assert!(!results.stats.cached);
    assert_eq!(topic_ids(&results), vec![1]);
}

// ============================================================================
// Configuration
// ============================================================================

fn open(dir: &TempDir) -> Result<SearchEngine, SearchError> {
    SearchEngine::open(
        Arc::new(Catalog::new()),
        Arc::new(InvertedIndex::new()),
        dir.path(),
    )
}

#[test]
fn test_tier7_open_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir).unwrap();
    assert_eq!(engine.config(), &SearchConfig::default());
    assert!(dir.path().join("search.toml").exists());
}

#[test]
fn test_tier7_open_reads_partial_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("search.toml"),
        "[query]\nper_page = 7\nbase_url = \"https://forum.example.com\"\n",
    )
    .unwrap();
    let engine = open(&dir).unwrap();
    assert_eq!(engine.config().query.per_page, 7);
    assert_eq!(engine.config().query.min_search_term_length, 3);
    assert_eq!(
        engine.config().query.base_url.as_deref(),
        Some("https://forum.example.com")
    );
}

#[test]
fn test_tier7_open_rejects_invalid_values() {
    let cases = [
        "[query]\nper_page = 0\n",
        "[ranking]\nbm25_b = 1.5\n",
        "[ranking]\ntitle_weight = -1.0\n",
        "[execution]\nindex_retry_attempts = 0\n",
        "[query]\nbase_url = \"forum.example.com\"\n",
        "[query\nper_page = ",
    ];
    for content in cases {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("search.toml"), content).unwrap();
        let err = open(&dir).err().unwrap();
        assert!(
            matches!(err, SearchError::InvalidConfig { .. }),
            "{:?} should be rejected",
            content
        );
    }
}

#[test]
fn test_tier7_saved_config_reopens() {
    let dir = TempDir::new().unwrap();
    let config = SearchConfig::default()
        .with_per_page(9)
        .with_min_search_term_length(4);
    config
        .write_to_file(&dir.path().join("search.toml"))
        .unwrap();
    assert_eq!(open(&dir).unwrap().config(), &config);
}
