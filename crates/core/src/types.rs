//! Identifier types for forum entities
//!
//! Every searchable entity is addressed by a small `u64` newtype. Keeping the
//! identifiers distinct at the type level means a `TopicId` can never be passed
//! where a `PostId` is expected, even though both are plain integers on disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw integer value
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a single post inside a topic
    PostId
);
entity_id!(
    /// Identifier of a topic (thread or private message)
    TopicId
);
entity_id!(
    /// Identifier of a user account
    UserId
);
entity_id!(
    /// Identifier of a category
    CategoryId
);
entity_id!(
    /// Identifier of a tag
    TagId
);
entity_id!(
    /// Identifier of a group
    GroupId
);
entity_id!(
    /// Identifier of a badge
    BadgeId
);
