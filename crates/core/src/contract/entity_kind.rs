//! Entity kind enumeration
//!
//! Every searchable entity reports which kind it is. The result aggregator
//! runs one searcher per kind and the index partitions documents by kind.
//!
//! ## The Searchable Kinds
//!
//! | Kind | Purpose | Facet |
//! |------|---------|-------|
//! | Post | A single reply or first post inside a topic | posts |
//! | Topic | A thread or private message container | posts (grouped) |
//! | User | A user account | users |
//! | Category | A category in the category tree | categories |
//! | Tag | A tag name | tags |
//! | Group | A user group | groups |

use serde::{Deserialize, Serialize};

/// The searchable entity kinds
///
/// ## Invariant
///
/// `EntityRef` variants match `EntityKind` variants 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A post inside a topic
    Post,
    /// A topic container
    Topic,
    /// A user account
    User,
    /// A category
    Category,
    /// A tag
    Tag,
    /// A group
    Group,
}

impl EntityKind {
    /// All entity kinds (for iteration)
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Post,
        EntityKind::Topic,
        EntityKind::User,
        EntityKind::Category,
        EntityKind::Tag,
        EntityKind::Group,
    ];

    /// Get all entity kinds as a slice
    pub fn all() -> &'static [EntityKind] {
        &Self::ALL
    }

    /// Short identifier (for serialization, logs, etc.)
    pub const fn id(&self) -> &'static str {
        match self {
            EntityKind::Post => "post",
            EntityKind::Topic => "topic",
            EntityKind::User => "user",
            EntityKind::Category => "category",
            EntityKind::Tag => "tag",
            EntityKind::Group => "group",
        }
    }

    /// Parse from short identifier
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "post" => Some(EntityKind::Post),
            "topic" => Some(EntityKind::Topic),
            "user" => Some(EntityKind::User),
            "category" => Some(EntityKind::Category),
            "tag" => Some(EntityKind::Tag),
            "group" => Some(EntityKind::Group),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
