//! Forum entity types
//!
//! These are the records the search engine reads: the category tree, topics
//! and their posts, users with their groups and badges, and tags. They carry
//! exactly the attributes that the filter grammar, the visibility rules and
//! the ranker consult. Authoring workflows live elsewhere.

pub mod category;
pub mod post;
pub mod topic;
pub mod user;

pub use category::{Category, CategoryPermission, PermissionType, SearchPriority};
pub use post::{Post, PostType};
pub use topic::{Archetype, Tag, Topic};
pub use user::{Badge, Group, GroupVisibility, NotificationLevel, TopicUserState, User};
