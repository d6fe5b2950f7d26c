//! Universal entity reference type
//!
//! Different entity kinds carry different identifier types. `EntityRef`
//! provides one uniform, hashable handle so that the index, the ranker and
//! the result aggregator can pass candidates around without knowing which
//! table they came from.
//!
//! ## Usage
//!
//! ```
//! use agora_core::{EntityKind, EntityRef, PostId};
//!
//! let post = EntityRef::post(PostId(42));
//! assert_eq!(post.kind(), EntityKind::Post);
//! assert_eq!(post.raw_id(), 42);
//! ```

use super::EntityKind;
use crate::types::{CategoryId, GroupId, PostId, TagId, TopicId, UserId};
use serde::{Deserialize, Serialize};

/// Universal reference to any searchable entity
///
/// ## Invariants
///
/// - Every EntityRef has exactly one variant (entity kind)
/// - EntityRef variants match EntityKind variants 1:1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    /// Reference to a post
    Post(PostId),
    /// Reference to a topic
    Topic(TopicId),
    /// Reference to a user
    User(UserId),
    /// Reference to a category
    Category(CategoryId),
    /// Reference to a tag
    Tag(TagId),
    /// Reference to a group
    Group(GroupId),
}

impl EntityRef {
    /// Create a post reference
    pub fn post(id: PostId) -> Self {
        EntityRef::Post(id)
    }

    /// Create a topic reference
    pub fn topic(id: TopicId) -> Self {
        EntityRef::Topic(id)
    }

    /// Create a user reference
    pub fn user(id: UserId) -> Self {
        EntityRef::User(id)
    }

    /// Create a category reference
    pub fn category(id: CategoryId) -> Self {
        EntityRef::Category(id)
    }

    /// Create a tag reference
    pub fn tag(id: TagId) -> Self {
        EntityRef::Tag(id)
    }

    /// Create a group reference
    pub fn group(id: GroupId) -> Self {
        EntityRef::Group(id)
    }

    /// Get the kind of this entity
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Post(_) => EntityKind::Post,
            EntityRef::Topic(_) => EntityKind::Topic,
            EntityRef::User(_) => EntityKind::User,
            EntityRef::Category(_) => EntityKind::Category,
            EntityRef::Tag(_) => EntityKind::Tag,
            EntityRef::Group(_) => EntityKind::Group,
        }
    }

    /// Raw integer identifier, used as the final deterministic tie-break
    pub fn raw_id(&self) -> u64 {
        match self {
            EntityRef::Post(id) => id.get(),
            EntityRef::Topic(id) => id.get(),
            EntityRef::User(id) => id.get(),
            EntityRef::Category(id) => id.get(),
            EntityRef::Tag(id) => id.get(),
            EntityRef::Group(id) => id.get(),
        }
    }

    /// The post id, if this is a post reference
    pub fn as_post(&self) -> Option<PostId> {
        match self {
            EntityRef::Post(id) => Some(*id),
            _ => None,
        }
    }

    /// The user id, if this is a user reference
    pub fn as_user(&self) -> Option<UserId> {
        match self {
            EntityRef::User(id) => Some(*id),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.raw_id())
    }
}
