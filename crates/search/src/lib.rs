//! Query engine for Agora forum search
//!
//! This crate provides:
//! - `normalize`: input cleanup (zero-width characters, quotes, NFC, trim)
//! - `query`: the query language (lexer, filter grammar, date values)
//! - `validate`: the minimum term length gate
//! - `visibility`: who may see what, and filter lookups through that lens
//! - `compiler`: parsed query + scope into index request and predicates
//! - `ranker`: text score × structural weight, explicit orders
//! - `searchers`: one searcher per result kind
//! - `engine`: the `SearchEngine` orchestrator
//! - `blurb`, `cache`, `config`: excerpts, anonymous cache, `search.toml`
//!
//! # Usage
//!
//! ```
//! use agora_core::{Category, CategoryId, Post, PostId, SearchOptions, Topic, TopicId, TypeFilter, UserId};
//! use agora_search::{SearchConfig, SearchEngine};
//! use agora_store::{Catalog, InvertedIndex};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::new());
//! catalog.upsert_category(Category::new(CategoryId(1), "Kitchen", "kitchen"));
//! catalog.upsert_topic(Topic::new(TopicId(1), "Omelettes", UserId(1)).with_category(CategoryId(1)));
//! catalog.upsert_post(Post::new(PostId(1), TopicId(1), 1, UserId(1), "whisk the eggs"));
//!
//! let engine = SearchEngine::new(catalog, Arc::new(InvertedIndex::new()), SearchConfig::default());
//! engine.indexer().rebuild().unwrap();
//!
//! let opts = SearchOptions::new().with_type_filter(TypeFilter::Topic);
//! let results = engine.execute("eggs #kitchen", &opts).unwrap();
//! assert_eq!(results.posts.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blurb;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod normalize;
pub mod query;
pub mod ranker;
pub mod searchers;
pub mod validate;
pub mod visibility;

pub use compiler::{compile, CompiledQuery, DirectLookup, Predicate, TextQuery};
pub use config::{ExecutionConfig, QueryConfig, RankingConfig, SearchConfig};
pub use engine::SearchEngine;
pub use normalize::normalize;
pub use query::{Filter, FilterSet, Query, QueryToken};
pub use ranker::Ranker;
pub use searchers::{SearchRequest, SearchResponse, Searchable};
pub use validate::{validate, Verdict};
pub use visibility::{Guardian, VisibilityScope};
