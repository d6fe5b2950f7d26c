//! Categories and their permissions

use crate::types::{CategoryId, GroupId};
use serde::{Deserialize, Serialize};

/// Access level a group holds on a read-restricted category
///
/// Every level implies read access; the differences only matter for
/// authoring, which is outside the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    /// Create topics, reply and read
    Full,
    /// Reply and read
    CreatePost,
    /// Read only
    Readonly,
}

/// A single group grant on a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryPermission {
    /// Group receiving the grant
    pub group_id: GroupId,
    /// Level granted
    pub permission: PermissionType,
}

/// Search priority tier of a category
///
/// Ordered from lowest to highest. `Ignore` categories still show up in
/// listings and when the query names them explicitly, but are left out of
/// keyword-ranked post hits otherwise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SearchPriority {
    /// Excluded from keyword hits unless named
    Ignore,
    /// Strongly demoted
    VeryLow,
    /// Demoted
    Low,
    /// No adjustment
    #[default]
    Normal,
    /// Promoted
    High,
    /// Strongly promoted
    VeryHigh,
}

impl SearchPriority {
    /// Parse a priority name as written in config files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ignore" => Some(SearchPriority::Ignore),
            "very_low" => Some(SearchPriority::VeryLow),
            "low" => Some(SearchPriority::Low),
            "normal" => Some(SearchPriority::Normal),
            "high" => Some(SearchPriority::High),
            "very_high" => Some(SearchPriority::VeryHigh),
            _ => None,
        }
    }
}

/// A category in the category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// URL slug, unique among siblings
    pub slug: String,
    /// Optional description, indexed for category search
    pub description: Option<String>,
    /// Parent category for sub-categories
    pub parent_id: Option<CategoryId>,
    /// When true only the groups in `permissions` (and staff) can read
    pub read_restricted: bool,
    /// Group grants
    pub permissions: Vec<CategoryPermission>,
    /// Search priority tier
    pub search_priority: SearchPriority,
}

impl Category {
    /// Create a public top-level category
    pub fn new(id: CategoryId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Category {
            id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            parent_id: None,
            read_restricted: false,
            permissions: vec![],
            search_priority: SearchPriority::Normal,
        }
    }

    /// Builder: set parent category
    pub fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: restrict to a group with the given permission
    ///
    /// Adding any grant marks the category read-restricted.
    pub fn with_group_permission(mut self, group_id: GroupId, permission: PermissionType) -> Self {
        self.read_restricted = true;
        self.permissions.push(CategoryPermission {
            group_id,
            permission,
        });
        self
    }

    /// Builder: set search priority
    pub fn with_search_priority(mut self, priority: SearchPriority) -> Self {
        self.search_priority = priority;
        self
    }
}
