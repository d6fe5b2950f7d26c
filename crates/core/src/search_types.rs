//! Core search types for the query engine
//!
//! This module defines the request/response surface of the engine:
//! - SearchOptions: everything a caller can ask for besides the term
//! - TypeFilter / SearchContext / Locale: request scoping
//! - RankedCandidate: one scored hit
//! - ResultSet: the full response, including pagination flags
//! - SearchStats: execution statistics for debugging/monitoring

use crate::contract::{EntityKind, EntityRef};
use crate::entities::Archetype;
use crate::identity::Identity;
use crate::types::{CategoryId, TopicId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// TypeFilter
// ============================================================================

/// Which result types a search returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    /// Header search: capped facets of every type
    #[default]
    All,
    /// Full-page topic search, one post per topic
    Topic,
    /// Full-page private message search
    PrivateMessages,
    /// Users only
    User,
    /// Categories only
    Category,
    /// Tags only
    Tag,
    /// Groups only
    Group,
}

impl TypeFilter {
    /// Parse a type filter name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(TypeFilter::All),
            "topic" => Some(TypeFilter::Topic),
            "private_messages" => Some(TypeFilter::PrivateMessages),
            "user" => Some(TypeFilter::User),
            "category" => Some(TypeFilter::Category),
            "tag" => Some(TypeFilter::Tag),
            "group" => Some(TypeFilter::Group),
            _ => None,
        }
    }

    /// Entity kinds searched for this filter
    pub fn kinds(&self) -> &'static [EntityKind] {
        match self {
            TypeFilter::All => &[
                EntityKind::Post,
                EntityKind::User,
                EntityKind::Category,
                EntityKind::Tag,
                EntityKind::Group,
            ],
            TypeFilter::Topic | TypeFilter::PrivateMessages => &[EntityKind::Post],
            TypeFilter::User => &[EntityKind::User],
            TypeFilter::Category => &[EntityKind::Category],
            TypeFilter::Tag => &[EntityKind::Tag],
            TypeFilter::Group => &[EntityKind::Group],
        }
    }

    /// The kind whose row count drives `more_full_page_results`
    pub fn dominant_kind(&self) -> EntityKind {
        match self {
            TypeFilter::User => EntityKind::User,
            TypeFilter::Category => EntityKind::Category,
            TypeFilter::Tag => EntityKind::Tag,
            TypeFilter::Group => EntityKind::Group,
            _ => EntityKind::Post,
        }
    }

    /// Header search returns small capped facets instead of pages
    pub fn is_header(&self) -> bool {
        matches!(self, TypeFilter::All)
    }
}

// ============================================================================
// SearchContext
// ============================================================================

/// Confines a search to one container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum SearchContext {
    /// Posts inside one topic
    Topic(TopicId),
    /// Posts inside one category (and its sub-categories)
    Category(CategoryId),
    /// Posts in topics carrying one tag
    Tag(String),
    /// Posts written by one user
    UserProfile(UserId),
}

// ============================================================================
// Locale
// ============================================================================

/// Query locale; decides the default tokenization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// English and other space-delimited scripts
    #[default]
    English,
    /// Chinese
    Chinese,
    /// Japanese
    Japanese,
    /// Korean
    Korean,
    /// Any other space-delimited locale
    Other,
}

impl Locale {
    /// Parse a BCP-47-ish language tag ("zh_CN", "ja", "en-US")
    pub fn from_tag(tag: &str) -> Self {
        let lang = tag
            .split(|c| c == '_' || c == '-')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Locale::English,
            "zh" => Locale::Chinese,
            "ja" => Locale::Japanese,
            "ko" => Locale::Korean,
            _ => Locale::Other,
        }
    }

    /// Whether this locale writes without spaces between words
    pub fn is_cjk(&self) -> bool {
        matches!(self, Locale::Chinese | Locale::Japanese | Locale::Korean)
    }
}

// ============================================================================
// SearchOptions
// ============================================================================

/// Everything a caller controls besides the term
///
/// # Examples
///
/// ```
/// use agora_core::{Identity, SearchOptions, TypeFilter, UserId};
///
/// let opts = SearchOptions::new()
///     .with_identity(Identity::User(UserId(7)))
///     .with_type_filter(TypeFilter::Topic)
///     .with_page(2);
///
/// assert_eq!(opts.page, 2);
/// assert_eq!(opts.type_filter, TypeFilter::Topic);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Requesting identity
    pub identity: Identity,
    /// Result types to return
    pub type_filter: TypeFilter,
    /// Optional container restriction
    pub search_context: Option<SearchContext>,
    /// Attach excerpts to post hits
    pub include_blurbs: bool,
    /// 1-based page (values below 1 are treated as 1)
    pub page: u32,
    /// Override of the configured minimum term length
    pub min_search_term_length: Option<usize>,
    /// Treat an all-digit term as a direct id lookup
    pub search_for_id: bool,
    /// Only return posts from topics of this archetype
    pub restrict_to_archetype: Option<Archetype>,
    /// Bypass the anonymous result cache
    pub skip_cache: bool,
    /// Query locale
    pub locale: Locale,
    /// Override of CJK segmentation (defaults to the locale's behaviour)
    pub cjk_segmentation: Option<bool>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            identity: Identity::Anonymous,
            type_filter: TypeFilter::All,
            search_context: None,
            include_blurbs: false,
            page: 1,
            min_search_term_length: None,
            search_for_id: false,
            restrict_to_archetype: None,
            skip_cache: false,
            locale: Locale::English,
            cjk_segmentation: None,
        }
    }
}

impl SearchOptions {
    /// Create options with defaults (anonymous header search, page 1)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set identity
    pub fn with_identity(mut self, identity: impl Into<Identity>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Builder: set type filter
    pub fn with_type_filter(mut self, type_filter: TypeFilter) -> Self {
        self.type_filter = type_filter;
        self
    }

    /// Builder: set search context
    pub fn with_context(mut self, context: SearchContext) -> Self {
        self.search_context = Some(context);
        self
    }

    /// Builder: request blurbs
    pub fn with_blurbs(mut self) -> Self {
        self.include_blurbs = true;
        self
    }

    /// Builder: set page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Builder: override minimum term length
    pub fn with_min_search_term_length(mut self, len: usize) -> Self {
        self.min_search_term_length = Some(len);
        self
    }

    /// Builder: enable id lookup for numeric terms
    pub fn with_search_for_id(mut self) -> Self {
        self.search_for_id = true;
        self
    }

    /// Builder: restrict post results to one archetype
    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.restrict_to_archetype = Some(archetype);
        self
    }

    /// Builder: bypass the result cache
    pub fn with_skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Builder: set locale
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Page number clamped to at least 1
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }
}

// ============================================================================
// RankedCandidate
// ============================================================================

/// One scored result
///
/// `final_score = text_score * structural_weight`. When an explicit order is
/// requested the list is sorted on that field instead and `final_score` only
/// breaks ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Back-pointer to the entity
    pub entity_ref: EntityRef,
    /// Field-weighted score from the index
    pub text_score: f32,
    /// Multiplier from priority tier, status and pin state
    pub structural_weight: f32,
    /// Combined score
    pub final_score: f32,
    /// Topic of a post hit
    pub topic_id: Option<TopicId>,
    /// Post number of a post hit
    pub post_number: Option<u32>,
    /// Excerpt, when blurbs were requested
    pub blurb: Option<String>,
}

impl RankedCandidate {
    /// Create a candidate and compute its final score
    pub fn new(entity_ref: EntityRef, text_score: f32, structural_weight: f32) -> Self {
        RankedCandidate {
            entity_ref,
            text_score,
            structural_weight,
            final_score: text_score * structural_weight,
            topic_id: None,
            post_number: None,
            blurb: None,
        }
    }

    /// Builder: attach topic position for post hits
    pub fn with_position(mut self, topic_id: TopicId, post_number: u32) -> Self {
        self.topic_id = Some(topic_id);
        self.post_number = Some(post_number);
        self
    }
}

// ============================================================================
// SearchStats
// ============================================================================

/// Execution statistics for a search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Time spent in search (microseconds)
    pub elapsed_micros: u64,
    /// Total candidates considered
    pub candidates_considered: usize,
    /// Candidates per kind
    pub candidates_by_kind: BTreeMap<EntityKind, usize>,
    /// Served from the result cache
    pub cached: bool,
}

impl SearchStats {
    /// Create new SearchStats
    pub fn new(elapsed_micros: u64, candidates: usize) -> Self {
        SearchStats {
            elapsed_micros,
            candidates_considered: candidates,
            candidates_by_kind: BTreeMap::new(),
            cached: false,
        }
    }

    /// Add candidates count for a kind
    pub fn add_kind_candidates(&mut self, kind: EntityKind, count: usize) {
        *self.candidates_by_kind.entry(kind).or_insert(0) += count;
        self.candidates_considered += count;
    }
}

// ============================================================================
// ResultSet
// ============================================================================

/// Search results
///
/// Built fresh per execution. Only the paginator truncates the lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// The free-text term actually searched (empty when invalid)
    pub term: String,
    /// The query failed validation; nothing was searched
    pub invalid: bool,
    /// Type filter the results were produced for
    pub type_filter: TypeFilter,
    /// Post hits, ranked
    pub posts: Vec<RankedCandidate>,
    /// User hits
    pub users: Vec<RankedCandidate>,
    /// Category hits
    pub categories: Vec<RankedCandidate>,
    /// Tag hits
    pub tags: Vec<RankedCandidate>,
    /// Group hits
    pub groups: Vec<RankedCandidate>,
    /// 1-based page
    pub page: u32,
    /// Rows per page of the dominant type
    pub per_page: usize,
    /// Another full page exists after this one
    pub more_full_page_results: bool,
    /// Header facet overflow flags
    pub more_posts: bool,
    /// Header facet overflow flags
    pub more_users: bool,
    /// Header facet overflow flags
    pub more_categories: bool,
    /// Header facet overflow flags
    pub more_tags: bool,
    /// Header facet overflow flags
    pub more_groups: bool,
    /// Execution statistics
    pub stats: SearchStats,
}

impl ResultSet {
    /// Create an empty result set for a term
    pub fn empty(term: impl Into<String>, type_filter: TypeFilter, page: u32, per_page: usize) -> Self {
        ResultSet {
            term: term.into(),
            invalid: false,
            type_filter,
            posts: vec![],
            users: vec![],
            categories: vec![],
            tags: vec![],
            groups: vec![],
            page,
            per_page,
            more_full_page_results: false,
            more_posts: false,
            more_users: false,
            more_categories: false,
            more_tags: false,
            more_groups: false,
            stats: SearchStats::default(),
        }
    }

    /// Create the designed "invalid query" outcome: empty term, no hits
    pub fn invalid(type_filter: TypeFilter, page: u32, per_page: usize) -> Self {
        let mut rs = Self::empty("", type_filter, page, per_page);
        rs.invalid = true;
        rs
    }

    /// Hits for one entity kind
    pub fn hits(&self, kind: EntityKind) -> &[RankedCandidate] {
        match kind {
            EntityKind::Post | EntityKind::Topic => &self.posts,
            EntityKind::User => &self.users,
            EntityKind::Category => &self.categories,
            EntityKind::Tag => &self.tags,
            EntityKind::Group => &self.groups,
        }
    }

    /// Mutable hits for one entity kind
    pub fn hits_mut(&mut self, kind: EntityKind) -> &mut Vec<RankedCandidate> {
        match kind {
            EntityKind::Post | EntityKind::Topic => &mut self.posts,
            EntityKind::User => &mut self.users,
            EntityKind::Category => &mut self.categories,
            EntityKind::Tag => &mut self.tags,
            EntityKind::Group => &mut self.groups,
        }
    }

    /// Set the header overflow flag of one kind
    pub fn set_more(&mut self, kind: EntityKind, more: bool) {
        match kind {
            EntityKind::Post | EntityKind::Topic => self.more_posts = more,
            EntityKind::User => self.more_users = more,
            EntityKind::Category => self.more_categories = more,
            EntityKind::Tag => self.more_tags = more,
            EntityKind::Group => self.more_groups = more,
        }
    }

    /// Check if every list is empty
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
            && self.users.is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.groups.is_empty()
    }

    /// Entity refs of the post hits, in rank order
    pub fn post_refs(&self) -> Vec<EntityRef> {
        self.posts.iter().map(|c| c.entity_ref).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
