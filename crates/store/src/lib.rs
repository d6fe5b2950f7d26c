//! Storage collaborators for the Agora search engine
//!
//! - `catalog`: in-memory entity store (categories, topics, posts, users,
//!   tags, groups, badges and per-user state)
//! - `index`: the `FullTextIndex` contract and an in-memory inverted index
//! - `indexer`: idempotent derivation of index documents from the catalog
//! - `tokenizer`: the shared tokenizer used for documents and query terms

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod index;
pub mod indexer;
pub mod tokenizer;

pub use catalog::Catalog;
pub use index::{
    Bm25Params, FieldWeights, FullTextIndex, IndexDocument, IndexField, IndexHit, IndexQuery,
    InvertedIndex,
};
pub use indexer::Indexer;
pub use tokenizer::{contains_cjk, is_cjk, tokenize, tokenize_unique};
