//! Posts

use crate::types::{PostId, TopicId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    /// Ordinary post
    #[default]
    Regular,
    /// Staff-only whisper
    Whisper,
    /// Small action notice ("closed this topic")
    SmallAction,
    /// Moderator action notice
    ModeratorAction,
}

/// A post inside a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier
    pub id: PostId,
    /// Containing topic
    pub topic_id: TopicId,
    /// 1-based position inside the topic
    pub post_number: u32,
    /// Author
    pub user_id: UserId,
    /// Plain text body
    pub raw: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Likes received
    pub like_count: u32,
    /// Editable by everyone
    pub wiki: bool,
    /// Hidden by flags
    pub hidden: bool,
    /// Soft-deleted
    pub deleted: bool,
    /// Kind of post
    pub post_type: PostType,
    /// Number of embedded images
    pub image_count: u32,
    /// Lowercase extensions of attached uploads
    pub upload_extensions: Vec<String>,
}

impl Post {
    /// Create a regular post
    pub fn new(
        id: PostId,
        topic_id: TopicId,
        post_number: u32,
        user_id: UserId,
        raw: impl Into<String>,
    ) -> Self {
        Post {
            id,
            topic_id,
            post_number,
            user_id,
            raw: raw.into(),
            created_at: Utc::now(),
            like_count: 0,
            wiki: false,
            hidden: false,
            deleted: false,
            post_type: PostType::Regular,
            image_count: 0,
            upload_extensions: vec![],
        }
    }

    /// Builder: set creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builder: set like count
    pub fn with_likes(mut self, like_count: u32) -> Self {
        self.like_count = like_count;
        self
    }

    /// Builder: attach uploads by file name
    pub fn with_uploads<I, S>(mut self, file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in file_names {
            if let Some((_, ext)) = name.as_ref().rsplit_once('.') {
                self.upload_extensions.push(ext.to_lowercase());
            }
        }
        self
    }

    /// Whether this is the first post of its topic
    pub fn is_first_post(&self) -> bool {
        self.post_number == 1
    }
}
