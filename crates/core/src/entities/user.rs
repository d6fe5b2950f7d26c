//! Users, groups, badges and per-user topic state

use crate::types::{BadgeId, GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: UserId,
    /// Unique handle, matched case-insensitively
    pub username: String,
    /// Optional display name
    pub name: Option<String>,
    /// Administrator
    pub admin: bool,
    /// Moderator
    pub moderator: bool,
    /// Created implicitly (e.g. by incoming email), never logged in
    pub staged: bool,
    /// Account activated
    pub active: bool,
    /// Suspended
    pub suspended: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create an active regular user
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        User {
            id,
            username: username.into(),
            name: None,
            admin: false,
            moderator: false,
            staged: false,
            active: true,
            suspended: false,
            created_at: Utc::now(),
        }
    }

    /// Create an administrator
    pub fn admin(id: UserId, username: impl Into<String>) -> Self {
        let mut user = User::new(id, username);
        user.admin = true;
        user
    }

    /// Builder: set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Admins and moderators
    pub fn is_staff(&self) -> bool {
        self.admin || self.moderator
    }
}

/// Who may see a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupVisibility {
    /// Everyone, including anonymous visitors
    #[default]
    Public,
    /// Any logged-in user
    LoggedOnUsers,
    /// Members only
    Members,
    /// Staff only
    Staff,
}

/// A user group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Identifier
    pub id: GroupId,
    /// Unique handle
    pub name: String,
    /// Optional display name
    pub full_name: Option<String>,
    /// Visibility level
    pub visibility: GroupVisibility,
}

impl Group {
    /// Create a public group
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Group {
            id,
            name: name.into(),
            full_name: None,
            visibility: GroupVisibility::Public,
        }
    }

    /// Builder: set visibility
    pub fn with_visibility(mut self, visibility: GroupVisibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// A badge that users can be granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Identifier
    pub id: BadgeId,
    /// Display name, matched case-insensitively
    pub name: String,
}

impl Badge {
    /// Create a badge
    pub fn new(id: BadgeId, name: impl Into<String>) -> Self {
        Badge {
            id,
            name: name.into(),
        }
    }
}

/// Topic notification level for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// No notifications
    Muted,
    /// Default
    #[default]
    Regular,
    /// Unread counts
    Tracking,
    /// Every post
    Watching,
}

/// Per-user state for one topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicUserState {
    /// Highest post number read (0 = never opened)
    pub last_read_post_number: u32,
    /// Notification level
    pub notification_level: NotificationLevel,
    /// The user has posted in this topic
    pub posted: bool,
}
