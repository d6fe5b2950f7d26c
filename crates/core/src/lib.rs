//! Core types for the Agora forum search engine
//!
//! This crate defines the foundational types used throughout the system:
//! - Identifiers: PostId, TopicId, UserId, CategoryId, TagId, GroupId, BadgeId
//! - Entities: Post, Topic, User, Category, Tag, Group, Badge
//! - Contract types: EntityRef, EntityKind
//! - Identity: who is searching
//! - Search types: SearchOptions, TypeFilter, SearchContext, RankedCandidate, ResultSet
//! - Error: the error taxonomy observable by callers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod entities;
pub mod error;
pub mod identity;
pub mod search_types;
pub mod types;

pub use contract::{EntityKind, EntityRef};
pub use entities::{
    Archetype, Badge, Category, CategoryPermission, Group, GroupVisibility, NotificationLevel,
    PermissionType, Post, PostType, SearchPriority, Tag, Topic, TopicUserState, User,
};
pub use error::{Result, SearchError};
pub use identity::Identity;
pub use search_types::{
    Locale, RankedCandidate, ResultSet, SearchContext, SearchOptions, SearchStats, TypeFilter,
};
pub use types::{BadgeId, CategoryId, GroupId, PostId, TagId, TopicId, UserId};
