//! Search configuration via `search.toml`
//!
//! One file per deployment, three sections:
//! - `[query]`: term length gate, page sizes, blurbs, CJK, base URL
//! - `[ranking]`: field weights, BM25 parameters, structural multipliers
//! - `[execution]`: wall-time budget, index retries, result cache TTL
//!
//! Missing keys fall back to defaults. A default file is written on first
//! use by `write_default_if_missing`; edit it and restart to change settings.
//! Configuration is always passed explicitly; nothing is read from globals.

use agora_core::{SearchError, SearchPriority};
use agora_store::{Bm25Params, FieldWeights};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "search.toml";

// ============================================================================
// [query]
// ============================================================================

/// Query parsing and pagination settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Minimum characters an unquoted term needs for the query to be valid
    pub min_search_term_length: usize,
    /// Minimum used when CJK segmentation is active
    pub cjk_min_search_term_length: usize,
    /// Rows per full page
    pub per_page: usize,
    /// Rows per facet in header search
    pub per_facet: usize,
    /// Highest page that can be requested; larger pages are clamped
    pub max_page: u32,
    /// Maximum blurb length in characters
    pub blurb_length: usize,
    /// Segment CJK text for CJK locales
    pub cjk_segmentation: bool,
    /// Public base URL; absolute links on this host resolve to direct lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            min_search_term_length: 3,
            cjk_min_search_term_length: 1,
            per_page: 50,
            per_facet: 5,
            max_page: 100,
            blurb_length: 200,
            cjk_segmentation: true,
            base_url: None,
        }
    }
}

// ============================================================================
// [ranking]
// ============================================================================

/// Multipliers per category search priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityMultipliers {
    /// `ignore`
    pub ignore: f32,
    /// `very_low`
    pub very_low: f32,
    /// `low`
    pub low: f32,
    /// `normal`
    pub normal: f32,
    /// `high`
    pub high: f32,
    /// `very_high`
    pub very_high: f32,
}

impl Default for PriorityMultipliers {
    fn default() -> Self {
        PriorityMultipliers {
            ignore: 0.01,
            very_low: 0.3,
            low: 0.6,
            normal: 1.0,
            high: 1.3,
            very_high: 2.0,
        }
    }
}

/// Relevance model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Title field weight
    pub title_weight: f32,
    /// Body field weight
    pub body_weight: f32,
    /// Category name field weight
    pub category_weight: f32,
    /// Tags field weight
    pub tags_weight: f32,
    /// BM25 term frequency saturation
    pub bm25_k1: f32,
    /// BM25 length normalization
    pub bm25_b: f32,
    /// Multiplier for closed topics
    pub closed_penalty: f32,
    /// Multiplier for archived topics
    pub archived_penalty: f32,
    /// Multiplier for pinned topics (relevance ordering only)
    pub pinned_bonus: f32,
    /// Category priority multipliers
    pub priority: PriorityMultipliers,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            title_weight: 1.0,
            body_weight: 0.4,
            category_weight: 0.3,
            tags_weight: 0.2,
            bm25_k1: 1.2,
            bm25_b: 0.75,
            closed_penalty: 0.9,
            archived_penalty: 0.85,
            pinned_bonus: 1.1,
            priority: PriorityMultipliers::default(),
        }
    }
}

impl RankingConfig {
    /// Index scoring parameters
    pub fn bm25_params(&self) -> Bm25Params {
        Bm25Params {
            k1: self.bm25_k1,
            b: self.bm25_b,
            weights: FieldWeights {
                title: self.title_weight,
                body: self.body_weight,
                category: self.category_weight,
                tags: self.tags_weight,
            },
        }
    }

    /// Multiplier of a category priority tier
    pub fn priority_multiplier(&self, priority: SearchPriority) -> f32 {
        match priority {
            SearchPriority::Ignore => self.priority.ignore,
            SearchPriority::VeryLow => self.priority.very_low,
            SearchPriority::Low => self.priority.low,
            SearchPriority::Normal => self.priority.normal,
            SearchPriority::High => self.priority.high,
            SearchPriority::VeryHigh => self.priority.very_high,
        }
    }
}

// ============================================================================
// [execution]
// ============================================================================

/// Runtime limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Wall-time budget per query in milliseconds (0 disables the check)
    pub max_wall_time_ms: u64,
    /// Attempts per index query before `IndexUnavailable` is surfaced
    pub index_retry_attempts: u32,
    /// Lifetime of anonymous cache entries in seconds (0 disables caching)
    pub cache_ttl_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            max_wall_time_ms: 5_000,
            index_retry_attempts: 3,
            cache_ttl_secs: 60,
        }
    }
}

impl ExecutionConfig {
    /// Wall-time budget, if enabled
    pub fn max_wall_time(&self) -> Option<Duration> {
        (self.max_wall_time_ms > 0).then(|| Duration::from_millis(self.max_wall_time_ms))
    }

    /// Cache lifetime, if enabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

// ============================================================================
// SearchConfig
// ============================================================================

/// Search configuration loaded from `search.toml`.
///
/// # Example
///
/// ```toml
/// [query]
/// min_search_term_length = 3
/// per_page = 50
///
/// [ranking]
/// title_weight = 1.0
///
/// [execution]
/// max_wall_time_ms = 5000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Query parsing and pagination
    #[serde(default)]
    pub query: QueryConfig,
    /// Relevance model
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Runtime limits
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl SearchConfig {
    /// Builder: rows per full page
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.query.per_page = per_page;
        self
    }

    /// Builder: rows per header facet
    pub fn with_per_facet(mut self, per_facet: usize) -> Self {
        self.query.per_facet = per_facet;
        self
    }

    /// Builder: minimum term length
    pub fn with_min_search_term_length(mut self, len: usize) -> Self {
        self.query.min_search_term_length = len;
        self
    }

    /// Builder: public base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.query.base_url = Some(base_url.into());
        self
    }

    /// Builder: wall-time budget in milliseconds
    pub fn with_max_wall_time_ms(mut self, ms: u64) -> Self {
        self.execution.max_wall_time_ms = ms;
        self
    }

    /// Builder: cache lifetime in seconds
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.execution.cache_ttl_secs = secs;
        self
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for zero page sizes, negative or non-finite
    /// weights, `bm25_b` outside `[0, 1]`, zero retry attempts, or a base
    /// URL without an http(s) scheme.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.per_page == 0 || self.query.per_facet == 0 {
            return Err(SearchError::invalid_config(
                "per_page and per_facet must be at least 1",
            ));
        }
        if self.query.max_page == 0 {
            return Err(SearchError::invalid_config("max_page must be at least 1"));
        }
        let r = &self.ranking;
        let p = &r.priority;
        let weights = [
            ("title_weight", r.title_weight),
            ("body_weight", r.body_weight),
            ("category_weight", r.category_weight),
            ("tags_weight", r.tags_weight),
            ("bm25_k1", r.bm25_k1),
            ("closed_penalty", r.closed_penalty),
            ("archived_penalty", r.archived_penalty),
            ("pinned_bonus", r.pinned_bonus),
            ("priority.ignore", p.ignore),
            ("priority.very_low", p.very_low),
            ("priority.low", p.low),
            ("priority.normal", p.normal),
            ("priority.high", p.high),
            ("priority.very_high", p.very_high),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::invalid_config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&r.bm25_b) {
            return Err(SearchError::invalid_config(format!(
                "bm25_b must be between 0 and 1, got {}",
                r.bm25_b
            )));
        }
        if self.execution.index_retry_attempts == 0 {
            return Err(SearchError::invalid_config(
                "index_retry_attempts must be at least 1",
            ));
        }
        if let Some(url) = &self.query.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SearchError::invalid_config(format!(
                    "base_url '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Agora search configuration

[query]
# Unquoted terms shorter than this make a query invalid (quoted phrases are exempt)
min_search_term_length = 3
# Minimum used when CJK segmentation is active
cjk_min_search_term_length = 1
# Rows per full page, and per facet in header search
per_page = 50
per_facet = 5
# Requests for later pages are clamped to this page
max_page = 100
# Maximum excerpt length in characters
blurb_length = 200
# Segment Chinese/Japanese/Korean text for CJK locales
cjk_segmentation = true
# Absolute topic/post links on this host are resolved to direct lookups
# base_url = "https://forum.example.com"

[ranking]
# Field weights: title > body > category > tags
title_weight = 1.0
body_weight = 0.4
category_weight = 0.3
tags_weight = 0.2
# BM25 term-frequency saturation and length normalization
bm25_k1 = 1.2
bm25_b = 0.75
# Topic status multipliers
closed_penalty = 0.9
archived_penalty = 0.85
pinned_bonus = 1.1

[ranking.priority]
ignore = 0.01
very_low = 0.3
low = 0.6
normal = 1.0
high = 1.3
very_high = 2.0

[execution]
# Per-query wall-time budget in milliseconds (0 = unlimited)
max_wall_time_ms = 5000
# Attempts per index query before the failure is surfaced
index_retry_attempts = 3
# Anonymous result cache lifetime in seconds (0 = disabled)
cache_ttl_secs = 60
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SearchError::invalid_config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SearchConfig = toml::from_str(&content).map_err(|e| {
            SearchError::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), SearchError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                SearchError::invalid_config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), SearchError> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            SearchError::invalid_config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content).map_err(|e| {
            SearchError::invalid_config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
