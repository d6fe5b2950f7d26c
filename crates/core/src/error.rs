//! Error types for the search engine
//!
//! This module defines every error a caller of the engine can observe.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! An invalid query (too short, nothing left after filter extraction) is NOT
//! an error: it is reported through an empty, flagged `ResultSet`.

use thiserror::Error;

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the search engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The caller asked for a scope it has no right to
    ///
    /// Raised for anonymous private-message searches and for non-staff
    /// requests against another user's messages. Always surfaced.
    #[error("Access denied: {reason}")]
    AccessDenied {
        /// What was refused
        reason: String,
    },

    /// The full-text index is unavailable or failed the request
    #[error("Index unavailable: {reason}")]
    IndexUnavailable {
        /// Upstream failure description
        reason: String,
    },

    /// The query exceeded the configured wall-time budget
    #[error("Search timed out after {elapsed_ms}ms (budget {budget_ms}ms)")]
    Timeout {
        /// Time spent before giving up
        elapsed_ms: u64,
        /// Configured budget
        budget_ms: u64,
    },

    /// Configuration could not be read or is inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong
        reason: String,
    },

    /// A referenced entity does not exist
    #[error("Not found: {entity}")]
    NotFound {
        /// Entity description
        entity: String,
    },
}

impl SearchError {
    /// Create an access denied error
    pub fn access_denied(reason: impl Into<String>) -> Self {
        SearchError::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Create an index unavailable error
    pub fn index_unavailable(reason: impl Into<String>) -> Self {
        SearchError::IndexUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SearchError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        SearchError::NotFound {
            entity: entity.into(),
        }
    }

    /// Check if this error indicates a transient failure that could be retried
    ///
    /// Only upstream index failures qualify. Timeouts already consumed the
    /// whole budget and access decisions never change on retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, SearchError::IndexUnavailable { .. })
    }

    /// Check if this is an access denial
    pub fn is_access_denied(&self) -> bool {
        matches!(self, SearchError::AccessDenied { .. })
    }
}
