//! Full-text index contract and the in-memory inverted index
//!
//! This module provides:
//! - `FullTextIndex`: the index/remove/query primitive the engine talks to
//! - `InvertedIndex`: per-field posting lists with stored token streams
//! - Field-weighted BM25 scoring with per-field length normalization
//! - Prefix expansion over an ordered term dictionary
//! - Phrase matching (contiguous tokens inside a single field)
//!
//! # Idempotence
//!
//! `index()` removes any previous entry for the same `EntityRef` before
//! inserting, so re-indexing a document any number of times leaves exactly
//! one copy and the corpus statistics unchanged.
//!
//! # Memory Layout
//!
//! Posting entries carry a compact `u32` doc id. A single bidirectional
//! `DocIdMap` holds one copy of each `EntityRef`.

use crate::tokenizer::tokenize;
use agora_core::{EntityKind, EntityRef, Result, SearchError};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

/// Upper bound on dictionary terms a single prefix may expand to
const MAX_PREFIX_EXPANSIONS: usize = 64;

// ============================================================================
// Fields and scoring parameters
// ============================================================================

/// Indexed field of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexField {
    /// Topic title, username, category or tag name
    Title,
    /// Post body or description
    Body,
    /// Category name of the containing topic
    Category,
    /// Tag names of the containing topic
    Tags,
}

impl IndexField {
    fn slot(self) -> usize {
        match self {
            IndexField::Title => 0,
            IndexField::Body => 1,
            IndexField::Category => 2,
            IndexField::Tags => 3,
        }
    }
}

/// Per-field score multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    /// Title weight
    pub title: f32,
    /// Body weight
    pub body: f32,
    /// Category weight
    pub category: f32,
    /// Tags weight
    pub tags: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights {
            title: 1.0,
            body: 0.4,
            category: 0.3,
            tags: 0.2,
        }
    }
}

impl FieldWeights {
    /// Weight of one field
    pub fn weight(&self, field: IndexField) -> f32 {
        match field {
            IndexField::Title => self.title,
            IndexField::Body => self.body,
            IndexField::Category => self.category,
            IndexField::Tags => self.tags,
        }
    }
}

/// BM25 parameters plus field weights
///
/// Each field saturates independently: a field can contribute at most
/// `weight * (k1 + 1) * idf` per term no matter how often the term repeats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation
    pub k1: f32,
    /// Length normalization
    pub b: f32,
    /// Field multipliers
    pub weights: FieldWeights,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params {
            k1: 1.2,
            b: 0.75,
            weights: FieldWeights::default(),
        }
    }
}

// ============================================================================
// Documents, queries, hits
// ============================================================================

/// A document as handed to the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    /// Entity this document describes
    pub entity: EntityRef,
    /// Field texts; repeated fields are concatenated
    pub fields: Vec<(IndexField, String)>,
}

impl IndexDocument {
    /// Create an empty document for an entity
    pub fn new(entity: EntityRef) -> Self {
        IndexDocument {
            entity,
            fields: vec![],
        }
    }

    /// Builder: add a field
    pub fn with_field(mut self, field: IndexField, text: impl Into<String>) -> Self {
        self.fields.push((field, text.into()));
        self
    }
}

/// A query against the index
///
/// Every term and every phrase is required. An empty query (no terms, no
/// phrases) matches every document of the requested kinds with score 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexQuery {
    /// Tokenized terms
    pub terms: Vec<String>,
    /// Tokenized phrases; each must appear contiguously inside one field
    pub phrases: Vec<Vec<String>>,
    /// Terms also match dictionary entries they are a prefix of
    pub prefix: bool,
    /// Fields to match in (empty = all)
    pub fields: Vec<IndexField>,
    /// Entity kinds to return (empty = all)
    pub kinds: Vec<EntityKind>,
    /// Maximum hits
    pub limit: Option<usize>,
    /// Scoring parameters
    pub params: Bm25Params,
}

impl IndexQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add required terms
    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Builder: add a required phrase
    pub fn with_phrase<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases.push(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: enable prefix matching
    pub fn with_prefix(mut self, prefix: bool) -> Self {
        self.prefix = prefix;
        self
    }

    /// Builder: restrict fields
    pub fn with_fields(mut self, fields: Vec<IndexField>) -> Self {
        self.fields = fields;
        self
    }

    /// Builder: restrict kinds
    pub fn with_kinds(mut self, kinds: Vec<EntityKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Builder: cap hits
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder: scoring parameters
    pub fn with_params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    /// No terms and no phrases
    pub fn is_match_all(&self) -> bool {
        self.terms.is_empty() && self.phrases.iter().all(|p| p.is_empty())
    }
}

/// A scored index hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// Matched entity
    pub entity: EntityRef,
    /// Field-weighted BM25 score
    pub score: f32,
}

// ============================================================================
// FullTextIndex
// ============================================================================

/// The full-text index primitive
///
/// Implementations must be idempotent on `index()`: indexing the same
/// entity twice replaces the first entry.
pub trait FullTextIndex: Send + Sync {
    /// Insert or replace a document
    fn index(&self, doc: IndexDocument) -> Result<()>;

    /// Remove a document (no-op if absent)
    fn remove(&self, entity: &EntityRef) -> Result<()>;

    /// Run a query
    fn query(&self, query: &IndexQuery) -> Result<Vec<IndexHit>>;

    /// Number of live documents
    fn len(&self) -> usize;

    /// Whether the index holds no documents
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Version watermark, bumped on every mutation
    fn version(&self) -> u64;
}

// ============================================================================
// PostingEntry / PostingList
// ============================================================================

/// Entry in a posting list: one term inside one field of one document
#[derive(Debug, Clone, Copy)]
pub struct PostingEntry {
    /// Integer document identifier
    pub doc_id: u32,
    /// Field the term occurs in
    pub field: IndexField,
    /// Term frequency in that field
    pub tf: u32,
    /// Field length in tokens
    pub field_len: u32,
}

/// List of (document, field) pairs containing a term
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    /// Entries
    pub entries: Vec<PostingEntry>,
}

impl PostingList {
    /// Add an entry
    pub fn add(&mut self, entry: PostingEntry) {
        self.entries.push(entry);
    }

    /// Remove every entry of a document
    pub fn remove_by_id(&mut self, doc_id: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.doc_id != doc_id);
        before - self.entries.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// DocIdMap
// ============================================================================

/// Bidirectional mapping between EntityRef and compact u32 doc IDs.
struct DocIdMap {
    /// doc_id -> EntityRef (append-only)
    id_to_ref: RwLock<Vec<EntityRef>>,
    /// EntityRef -> doc_id
    ref_to_id: DashMap<EntityRef, u32>,
}

impl DocIdMap {
    fn new() -> Self {
        Self {
            id_to_ref: RwLock::new(Vec::new()),
            ref_to_id: DashMap::new(),
        }
    }

    fn get_or_insert(&self, entity: &EntityRef) -> u32 {
        if let Some(id) = self.ref_to_id.get(entity) {
            return *id;
        }
        let mut vec = self.id_to_ref.write();
        if let Some(id) = self.ref_to_id.get(entity) {
            return *id;
        }
        let id = vec.len() as u32;
        vec.push(*entity);
        self.ref_to_id.insert(*entity, id);
        id
    }

    fn get(&self, entity: &EntityRef) -> Option<u32> {
        self.ref_to_id.get(entity).map(|r| *r)
    }

    fn clear(&self) {
        self.id_to_ref.write().clear();
        self.ref_to_id.clear();
    }
}

/// Token streams of one stored document
struct StoredDoc {
    fields: Vec<(IndexField, Vec<String>)>,
}

impl StoredDoc {
    fn contains_phrase(&self, phrase: &[String], allowed: &[bool; 4]) -> bool {
        self.fields.iter().any(|(field, tokens)| {
            allowed[field.slot()]
                && tokens.len() >= phrase.len()
                && tokens.windows(phrase.len()).any(|w| w == phrase)
        })
    }
}

// ============================================================================
// InvertedIndex
// ============================================================================

/// In-memory inverted index
///
/// # Thread Safety
///
/// Readers run concurrently. Writers are serialized by an internal mutex so
/// that the remove-then-insert of a re-index is atomic with respect to
/// other writers.
///
/// # Version Watermark
///
/// Incremented on every insert, removal and clear.
pub struct InvertedIndex {
    /// Term -> PostingList
    postings: DashMap<String, PostingList>,
    /// Term -> document frequency, ordered for prefix expansion
    term_dict: RwLock<BTreeMap<String, usize>>,
    /// doc_id -> stored token streams (None once removed)
    docs: RwLock<Vec<Option<StoredDoc>>>,
    /// EntityRef <-> u32
    doc_id_map: DocIdMap,
    /// Sum of field lengths, per field slot
    field_len_totals: [AtomicUsize; 4],
    /// Live documents
    total_docs: AtomicUsize,
    /// Queries and writes fail while disabled
    enabled: AtomicBool,
    /// Version watermark
    version: AtomicU64,
    /// Serializes writers
    writer: Mutex<()>,
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InvertedIndex {
    /// Create a new, enabled, empty index
    pub fn new() -> Self {
        InvertedIndex {
            postings: DashMap::new(),
            term_dict: RwLock::new(BTreeMap::new()),
            docs: RwLock::new(Vec::new()),
            doc_id_map: DocIdMap::new(),
            field_len_totals: Default::default(),
            total_docs: AtomicUsize::new(0),
            enabled: AtomicBool::new(true),
            version: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    // ========================================================================
    // Enable/Disable
    // ========================================================================

    /// Check if index is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enable the index
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    /// Disable the index; every call then fails with `IndexUnavailable`
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(SearchError::index_unavailable("index is disabled"))
        }
    }

    /// Clear all index data
    pub fn clear(&self) {
        let _guard = self.writer.lock();
        self.postings.clear();
        self.term_dict.write().clear();
        self.docs.write().clear();
        self.doc_id_map.clear();
        for total in &self.field_len_totals {
            total.store(0, Ordering::Relaxed);
        }
        self.total_docs.store(0, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Number of live documents
    pub fn total_docs(&self) -> usize {
        self.total_docs.load(Ordering::Acquire)
    }

    /// Number of documents containing a term
    pub fn doc_freq(&self, term: &str) -> usize {
        self.term_dict.read().get(term).copied().unwrap_or(0)
    }

    /// Whether an entity is currently indexed
    pub fn contains(&self, entity: &EntityRef) -> bool {
        match self.doc_id_map.get(entity) {
            Some(doc_id) => self
                .docs
                .read()
                .get(doc_id as usize)
                .map_or(false, |d| d.is_some()),
            None => false,
        }
    }

    /// Every term in the dictionary, sorted
    pub fn terms(&self) -> Vec<String> {
        self.term_dict.read().keys().cloned().collect()
    }

    fn avg_field_lens(&self) -> [f32; 4] {
        let n = self.total_docs().max(1) as f32;
        let mut avg = [1.0f32; 4];
        for (slot, total) in self.field_len_totals.iter().enumerate() {
            avg[slot] = (total.load(Ordering::Relaxed) as f32 / n).max(1.0);
        }
        avg
    }

    // ========================================================================
    // Writes
    // ========================================================================

    fn insert_locked(&self, doc: IndexDocument) {
        let doc_id = self.doc_id_map.get_or_insert(&doc.entity);
        self.remove_locked(doc_id);

        // Concatenate repeated fields in slot order
        let mut merged: BTreeMap<IndexField, Vec<String>> = BTreeMap::new();
        for (field, text) in &doc.fields {
            merged.entry(*field).or_default().extend(tokenize(text));
        }

        let mut tf_map: FxHashMap<&str, FxHashMap<IndexField, u32>> = FxHashMap::default();
        for (field, tokens) in &merged {
            for token in tokens {
                *tf_map
                    .entry(token.as_str())
                    .or_default()
                    .entry(*field)
                    .or_insert(0) += 1;
            }
        }

        for (term, per_field) in &tf_map {
            let mut list = self.postings.entry(term.to_string()).or_default();
            for (field, tf) in per_field {
                let field_len = merged.get(field).map_or(0, |t| t.len()) as u32;
                list.add(PostingEntry {
                    doc_id,
                    field: *field,
                    tf: *tf,
                    field_len,
                });
            }
        }
        {
            let mut dict = self.term_dict.write();
            for term in tf_map.keys() {
                *dict.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        for (field, tokens) in &merged {
            self.field_len_totals[field.slot()].fetch_add(tokens.len(), Ordering::Relaxed);
        }

        {
            let mut docs = self.docs.write();
            let idx = doc_id as usize;
            if idx >= docs.len() {
                docs.resize_with(idx + 1, || None);
            }
            docs[idx] = Some(StoredDoc {
                fields: merged.into_iter().collect(),
            });
        }

        self.total_docs.fetch_add(1, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    fn remove_locked(&self, doc_id: u32) {
        let stored = match self.docs.write().get_mut(doc_id as usize) {
            Some(slot) => slot.take(),
            None => None,
        };
        let Some(stored) = stored else {
            return;
        };

        let mut unique: FxHashSet<&str> = FxHashSet::default();
        for (field, tokens) in &stored.fields {
            self.field_len_totals[field.slot()].fetch_sub(tokens.len(), Ordering::Relaxed);
            unique.extend(tokens.iter().map(String::as_str));
        }

        for term in &unique {
            if let Some(mut list) = self.postings.get_mut(*term) {
                list.remove_by_id(doc_id);
            }
            self.postings.remove_if(*term, |_, list| list.is_empty());
        }
        {
            let mut dict = self.term_dict.write();
            for term in &unique {
                if let Some(df) = dict.get_mut(*term) {
                    *df = df.saturating_sub(1);
                    if *df == 0 {
                        dict.remove(*term);
                    }
                }
            }
        }

        self.total_docs.fetch_sub(1, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn expand(&self, term: &str, prefix: bool) -> Vec<String> {
        let dict = self.term_dict.read();
        if !prefix {
            return if dict.contains_key(term) {
                vec![term.to_string()]
            } else {
                vec![]
            };
        }
        dict.range(term.to_string()..)
            .take_while(|(k, _)| k.starts_with(term))
            .take(MAX_PREFIX_EXPANSIONS)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn score_term(
        &self,
        term: &str,
        params: &Bm25Params,
        allowed: &[bool; 4],
        avg_lens: &[f32; 4],
        total_docs: f32,
    ) -> FxHashMap<u32, f32> {
        let mut scores = FxHashMap::default();
        let df = self.doc_freq(term) as f32;
        if df == 0.0 {
            return scores;
        }
        let idf = ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln();
        let k1 = params.k1;
        let b = params.b;

        if let Some(list) = self.postings.get(term) {
            for entry in &list.entries {
                let slot = entry.field.slot();
                if !allowed[slot] {
                    continue;
                }
                let weight = params.weights.weight(entry.field);
                if weight <= 0.0 {
                    continue;
                }
                let tf = entry.tf as f32;
                let norm = 1.0 - b + b * entry.field_len as f32 / avg_lens[slot];
                let tf_component = (tf * (k1 + 1.0)) / (tf + k1 * norm);
                *scores.entry(entry.doc_id).or_insert(0.0) += idf * weight * tf_component;
            }
        }
        scores
    }

    fn run_query(&self, query: &IndexQuery) -> Vec<IndexHit> {
        let mut allowed = [query.fields.is_empty(); 4];
        for field in &query.fields {
            allowed[field.slot()] = true;
        }
        let kind_ok = |entity: &EntityRef| {
            query.kinds.is_empty() || query.kinds.contains(&entity.kind())
        };

        let scored: Vec<(u32, f32)> = if query.is_match_all() {
            self.docs
                .read()
                .iter()
                .enumerate()
                .filter(|(_, d)| d.is_some())
                .map(|(id, _)| (id as u32, 0.0))
                .collect()
        } else {
            let total_docs = self.total_docs() as f32;
            let avg_lens = self.avg_field_lens();
            let mut acc: Option<FxHashMap<u32, f32>> = None;

            for term in &query.terms {
                let mut best: FxHashMap<u32, f32> = FxHashMap::default();
                for expansion in self.expand(term, query.prefix) {
                    let scores =
                        self.score_term(&expansion, &query.params, &allowed, &avg_lens, total_docs);
                    for (doc_id, score) in scores {
                        let slot = best.entry(doc_id).or_insert(0.0);
                        if score > *slot {
                            *slot = score;
                        }
                    }
                }
                acc = Some(intersect(acc, best));
                if acc.as_ref().map_or(false, |a| a.is_empty()) {
                    return vec![];
                }
            }

            for phrase in query.phrases.iter().filter(|p| !p.is_empty()) {
                let mut phrase_scores: Option<FxHashMap<u32, f32>> = None;
                for token in phrase {
                    let scores =
                        self.score_term(token, &query.params, &allowed, &avg_lens, total_docs);
                    phrase_scores = Some(intersect(phrase_scores, scores));
                }
                let mut candidates = phrase_scores.unwrap_or_default();
                {
                    let docs = self.docs.read();
                    candidates.retain(|doc_id, _| {
                        docs.get(*doc_id as usize)
                            .and_then(|d| d.as_ref())
                            .map_or(false, |d| d.contains_phrase(phrase, &allowed))
                    });
                }
                acc = Some(intersect(acc, candidates));
                if acc.as_ref().map_or(false, |a| a.is_empty()) {
                    return vec![];
                }
            }
            acc.unwrap_or_default().into_iter().collect()
        };

        let id_to_ref = self.doc_id_map.id_to_ref.read();
        let mut hits: Vec<IndexHit> = scored
            .into_iter()
            .filter_map(|(doc_id, score)| {
                id_to_ref
                    .get(doc_id as usize)
                    .filter(|e| kind_ok(*e))
                    .map(|entity| IndexHit {
                        entity: *entity,
                        score,
                    })
            })
            .collect();
        drop(id_to_ref);

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entity.cmp(&b.entity))
        });
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        hits
    }
}

/// Intersect running scores with a new requirement, summing scores
fn intersect(acc: Option<FxHashMap<u32, f32>>, next: FxHashMap<u32, f32>) -> FxHashMap<u32, f32> {
    match acc {
        None => next,
        Some(mut acc) => {
            acc.retain(|doc_id, _| next.contains_key(doc_id));
            for (doc_id, score) in acc.iter_mut() {
                *score += next.get(doc_id).copied().unwrap_or(0.0);
            }
            acc
        }
    }
}

impl FullTextIndex for InvertedIndex {
    fn index(&self, doc: IndexDocument) -> Result<()> {
        self.ensure_enabled()?;
        let _guard = self.writer.lock();
        self.insert_locked(doc);
        Ok(())
    }

    fn remove(&self, entity: &EntityRef) -> Result<()> {
        self.ensure_enabled()?;
        let _guard = self.writer.lock();
        if let Some(doc_id) = self.doc_id_map.get(entity) {
            self.remove_locked(doc_id);
        }
        Ok(())
    }

    fn query(&self, query: &IndexQuery) -> Result<Vec<IndexHit>> {
        self.ensure_enabled()?;
        let hits = self.run_query(query);
        debug!(
            terms = query.terms.len(),
            phrases = query.phrases.len(),
            hits = hits.len(),
            "index query"
        );
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.total_docs()
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

// ============================================================================
// Tests
// ============================================================================
