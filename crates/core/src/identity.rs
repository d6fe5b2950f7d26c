//! Requesting identity
//!
//! The engine never trusts flags carried by the caller: an identity is only
//! a user id. Staff status and group membership are looked up fresh on every
//! check by the guardian.

use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Who is searching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// Logged-out visitor
    #[default]
    Anonymous,
    /// Logged-in user
    User(UserId),
}

impl Identity {
    /// The user id, if logged in
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(*id),
        }
    }

    /// Whether this is a logged-out visitor
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

impl From<UserId> for Identity {
    fn from(id: UserId) -> Self {
        Identity::User(id)
    }
}

impl From<Option<UserId>> for Identity {
    fn from(id: Option<UserId>) -> Self {
        id.map(Identity::User).unwrap_or(Identity::Anonymous)
    }
}
