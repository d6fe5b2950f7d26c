//! Engine Comprehensive Test Suite
//!
//! End-to-end behaviour of `SearchEngine::execute` through the public
//! `agora` facade.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Query Validation** (min length, phrases, normalization)
//! - **Tier 2: Filter Grammar** (tags, categories, users, dates, status, counts)
//! - **Tier 3: Visibility** (restricted categories, private messages)
//! - **Tier 4: Ranking** (field weights, saturation, explicit orders)
//! - **Tier 5: Pagination** (pages, header facets, overflow flags)
//! - **Tier 6: Lookups and Locales** (id and URL search, CJK)
//! - **Tier 7: Failure Modes** (index outages, configuration files)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test engine_comprehensive
//!
//! # Run specific tier
//! cargo test --test engine_comprehensive tier2
//! ```

mod test_utils;

// Tier 1: Query Validation
mod tier1_validation;

// Tier 2: Filter Grammar
mod tier2_filters;

// Tier 3: Visibility
mod tier3_visibility;

// Tier 4: Ranking
mod tier4_ranking;

// Tier 5: Pagination
mod tier5_pagination;

// Tier 6: Lookups and Locales
mod tier6_lookups;

// Tier 7: Failure Modes
mod tier7_failures;
