//! Topics (containers) and tags

use crate::types::{CategoryId, GroupId, TagId, TopicId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad kind of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Ordinary public thread in a category
    #[default]
    Regular,
    /// Private message between allowed users and groups
    PrivateMessage,
}

/// A topic: the container of posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Identifier
    pub id: TopicId,
    /// Title, indexed with the highest weight
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Category (None for private messages)
    pub category_id: Option<CategoryId>,
    /// Regular thread or private message
    pub archetype: Archetype,
    /// Creator
    pub user_id: UserId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// View counter
    pub views: u64,
    /// Number of live posts, maintained by the catalog
    pub posts_count: u32,
    /// Sum of post likes, maintained by the catalog
    pub like_count: u32,
    /// Listed; unlisted topics are only visible to staff
    pub visible: bool,
    /// Closed for replies
    pub closed: bool,
    /// Archived (read-only)
    pub archived: bool,
    /// Pinned in its category
    pub pinned: bool,
    /// Soft-deleted
    pub deleted: bool,
    /// Tag names
    pub tags: Vec<String>,
    /// Users allowed on a private message
    pub allowed_users: Vec<UserId>,
    /// Groups allowed on a private message
    pub allowed_groups: Vec<GroupId>,
}

impl Topic {
    /// Create an open, visible regular topic
    pub fn new(id: TopicId, title: impl Into<String>, user_id: UserId) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Topic {
            id,
            title,
            slug,
            category_id: None,
            archetype: Archetype::Regular,
            user_id,
            created_at: Utc::now(),
            views: 0,
            posts_count: 0,
            like_count: 0,
            visible: true,
            closed: false,
            archived: false,
            pinned: false,
            deleted: false,
            tags: vec![],
            allowed_users: vec![],
            allowed_groups: vec![],
        }
    }

    /// Create a private message between the given users
    pub fn private_message(
        id: TopicId,
        title: impl Into<String>,
        user_id: UserId,
        allowed_users: Vec<UserId>,
    ) -> Self {
        let mut topic = Topic::new(id, title, user_id);
        topic.archetype = Archetype::PrivateMessage;
        topic.allowed_users = allowed_users;
        topic
    }

    /// Builder: set category
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Builder: set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builder: set view count
    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    /// Builder: allow a group on a private message
    pub fn with_allowed_group(mut self, group_id: GroupId) -> Self {
        self.allowed_groups.push(group_id);
        self
    }

    /// Whether this topic is a private message
    pub fn is_private_message(&self) -> bool {
        self.archetype == Archetype::PrivateMessage
    }

    /// Whether this is a direct message: exactly two users, no groups
    pub fn is_direct_message(&self) -> bool {
        self.is_private_message() && self.allowed_users.len() == 2 && self.allowed_groups.is_empty()
    }
}

/// A tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Identifier
    pub id: TagId,
    /// Lowercase tag name
    pub name: String,
    /// Only staff may see or search this tag
    pub staff_only: bool,
}

impl Tag {
    /// Create a public tag; the name is lowercased
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Tag {
            id,
            name: name.into().to_lowercase(),
            staff_only: false,
        }
    }
}

/// Lowercase, ASCII-alphanumeric slug with single dashes
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "topic".to_string()
    } else {
        slug
    }
}
