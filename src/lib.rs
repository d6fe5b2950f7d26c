//! Agora - search query engine for discussion forums
//!
//! Agora turns free-form search input with an embedded filter grammar
//! (`tags:`, `#category`, `@user`, `before:`, `status:`, `order:` ...) into
//! ranked, permission-filtered result sets of posts, users, categories,
//! tags and groups.
//!
//! # Quick Start
//!
//! ```
//! use agora::{Catalog, InvertedIndex, SearchConfig, SearchEngine, SearchOptions, TypeFilter};
//! use agora::{Category, CategoryId, Post, PostId, Topic, TopicId, UserId};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::new());
//! catalog.upsert_category(Category::new(CategoryId(1), "Kitchen", "kitchen"));
//! catalog.upsert_topic(Topic::new(TopicId(1), "Omelettes", UserId(1)).with_category(CategoryId(1)));
//! catalog.upsert_post(Post::new(PostId(1), TopicId(1), 1, UserId(1), "whisk the eggs"));
//!
//! let engine = SearchEngine::new(catalog, Arc::new(InvertedIndex::new()), SearchConfig::default());
//! engine.indexer().rebuild()?;
//!
//! let results = engine.execute("eggs order:latest", &SearchOptions::new().with_type_filter(TypeFilter::Topic))?;
//! assert_eq!(results.posts.len(), 1);
//! # Ok::<(), agora::SearchError>(())
//! ```
//!
//! # Architecture
//!
//! - `agora-core`: identifiers, entities, options, results, errors
//! - `agora-store`: the catalog, the full-text index contract and indexer
//! - `agora-search`: query language, visibility, ranking and the engine

pub use agora_core::*;
pub use agora_search::{
    normalize, Filter, FilterSet, Query, QueryConfig, RankingConfig, SearchConfig, SearchEngine,
    Verdict,
};
pub use agora_store::{Catalog, FullTextIndex, Indexer, InvertedIndex};
