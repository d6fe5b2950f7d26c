//! Typed filters extracted from search input
//!
//! Every filter is a typed value resolved against the catalog at extraction
//! time (tags, categories, users, groups and badges carry their ids), so the
//! compiler never re-parses text and no input can alter predicate structure.

use agora_core::{BadgeId, CategoryId, GroupId, UserId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// How the names of a tag filter combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
    /// At least one tag (`tags:a,b`)
    Any,
    /// Every tag (`tags:a+b`)
    All,
}

/// How a user filter named its user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserIdentifier {
    /// By username
    Username(String),
    /// By numeric id
    Id(UserId),
    /// The requesting identity
    Me,
}

/// Which authorship a user filter checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    /// Wrote the post (`@name`, `user:name`)
    PostAuthor,
    /// Created the topic (`created:@name`)
    TopicCreator,
}

/// Topic status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatusFilter {
    /// Neither closed nor archived
    Open,
    /// Closed
    Closed,
    /// Archived
    Archived,
    /// Only the first post
    NoReplies,
    /// In a category without read restrictions
    Public,
    /// Deleted content (staff only)
    Deleted,
}

impl TopicStatusFilter {
    /// Parse a `status:` value
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "archived" => Some(Self::Archived),
            "noreplies" => Some(Self::NoReplies),
            "public" => Some(Self::Public),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Side of a date bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateDirection {
    /// Strictly before the start of the day
    Before,
    /// At or after the start of the day
    After,
}

/// Explicit result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Newest post first
    Latest,
    /// Newest topic first
    LatestTopic,
    /// Oldest post first
    Oldest,
    /// Oldest topic first
    OldestTopic,
    /// Most viewed topic first
    Views,
    /// Most liked post first
    Likes,
}

impl OrderBy {
    /// Parse an `order:` value
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "latest" => Some(Self::Latest),
            "latest_topic" => Some(Self::LatestTopic),
            "oldest" => Some(Self::Oldest),
            "oldest_topic" => Some(Self::OldestTopic),
            "views" => Some(Self::Views),
            "likes" => Some(Self::Likes),
            _ => None,
        }
    }
}

/// `in:` / `with:` scopes that need no lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    /// Pinned topics
    Pinned,
    /// Unpinned topics
    Unpinned,
    /// Wiki posts
    Wiki,
    /// Posts with images
    Images,
    /// Match in the title only
    Title,
    /// First posts only
    First,
    /// Topics with at least one tag
    Tagged,
    /// Topics without tags
    Untagged,
    /// Topics the identity has opened
    Seen,
    /// Topics the identity has never opened
    Unseen,
    /// Topics the identity watches
    Watching,
    /// Topics the identity tracks
    Tracking,
    /// Topics the identity posted in
    Posted,
    /// Topics the identity created
    Created,
    /// Posts the identity liked
    Likes,
    /// Posts the identity bookmarked
    Bookmarks,
}

impl ScopeFilter {
    /// Parse an `in:` value
    pub fn from_in(name: &str) -> Option<Self> {
        match name {
            "pinned" => Some(Self::Pinned),
            "unpinned" => Some(Self::Unpinned),
            "wiki" => Some(Self::Wiki),
            "title" => Some(Self::Title),
            "first" => Some(Self::First),
            "tagged" => Some(Self::Tagged),
            "untagged" => Some(Self::Untagged),
            "seen" => Some(Self::Seen),
            "unseen" => Some(Self::Unseen),
            "watching" => Some(Self::Watching),
            "tracking" => Some(Self::Tracking),
            "posted" => Some(Self::Posted),
            "created" => Some(Self::Created),
            "likes" => Some(Self::Likes),
            "bookmarks" => Some(Self::Bookmarks),
            _ => None,
        }
    }

    /// Scopes that only make sense for a logged-in identity
    pub fn is_personal(&self) -> bool {
        matches!(
            self,
            Self::Seen
                | Self::Unseen
                | Self::Watching
                | Self::Tracking
                | Self::Posted
                | Self::Created
                | Self::Likes
                | Self::Bookmarks
        )
    }
}

/// Numeric attribute a count bound applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountField {
    /// Topic posts count
    PostsCount,
    /// Topic views
    Views,
    /// Post likes
    Likes,
}

/// Comparison of a count bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal
    Exact,
    /// Greater or equal
    Min,
    /// Less or equal
    Max,
}

impl Comparison {
    /// Apply the comparison
    pub fn holds(&self, actual: u64, bound: u64) -> bool {
        match self {
            Comparison::Exact => actual == bound,
            Comparison::Min => actual >= bound,
            Comparison::Max => actual <= bound,
        }
    }
}

/// Which private messages a PM filter selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PmScope {
    /// Messages the identity participates in
    Participating,
    /// Two-person messages the identity participates in
    Direct,
    /// Messages of another user (staff only unless it is the identity)
    OfUser(UserId),
    /// Messages of a group (members and staff)
    OfGroup(GroupId),
}

/// A filter extracted from the query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "filter")]
pub enum Filter {
    /// Topic tags
    Tag {
        /// Lowercase tag names
        names: BTreeSet<String>,
        /// Combination mode
        mode: TagMatch,
        /// Exclude instead of require
        negate: bool,
    },
    /// Topic category
    Category {
        /// Slugs from the root to the selected category, as written
        slug_path: Vec<String>,
        /// Exclude sub-categories
        exact: bool,
        /// Resolved category
        id: CategoryId,
    },
    /// Post author or topic creator
    User {
        /// How the user was named
        identifier: UserIdentifier,
        /// Authorship checked
        role: AuthorRole,
        /// Resolved user
        id: UserId,
    },
    /// Topic status
    Status {
        /// Status value
        value: TopicStatusFilter,
    },
    /// Post creation date bound
    DateBound {
        /// Before or after
        direction: DateDirection,
        /// Day boundary (UTC)
        value: NaiveDate,
    },
    /// Explicit ordering
    Order {
        /// Order
        value: OrderBy,
    },
    /// Lookup-free scope
    Scope {
        /// Scope
        value: ScopeFilter,
    },
    /// Count bound
    Count {
        /// Attribute
        field: CountField,
        /// Comparison
        comparison: Comparison,
        /// Bound
        value: u64,
    },
    /// Author belongs to a group
    Group {
        /// Group name as written
        name: String,
        /// Resolved group
        id: GroupId,
    },
    /// Author holds a badge
    Badge {
        /// Badge name as written
        name: String,
        /// Resolved badge
        id: BadgeId,
    },
    /// Post has an upload with one of these extensions
    FileType {
        /// Lowercase extensions without dots
        extensions: BTreeSet<String>,
    },
    /// Private message scope
    PrivateMessages {
        /// Which messages
        mode: PmScope,
    },
    /// Second participant of a direct message
    Participant {
        /// Resolved user
        id: UserId,
    },
}

impl Filter {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Tag { .. } => "tag",
            Filter::Category { .. } => "category",
            Filter::User { .. } => "user",
            Filter::Status { .. } => "status",
            Filter::DateBound { .. } => "date",
            Filter::Order { .. } => "order",
            Filter::Scope { .. } => "scope",
            Filter::Count { .. } => "count",
            Filter::Group { .. } => "group",
            Filter::Badge { .. } => "badge",
            Filter::FileType { .. } => "filetype",
            Filter::PrivateMessages { .. } => "private_messages",
            Filter::Participant { .. } => "participant",
        }
    }
}

/// Filters in extraction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter
    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Iterate in extraction order
    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// No filters
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Effective explicit order; the last one written wins
    pub fn order(&self) -> Option<OrderBy> {
        self.filters.iter().rev().find_map(|f| match f {
            Filter::Order { value } => Some(*value),
            _ => None,
        })
    }

    /// Whether a lookup-free scope is present
    pub fn has_scope(&self, scope: ScopeFilter) -> bool {
        self.filters
            .iter()
            .any(|f| matches!(f, Filter::Scope { value } if *value == scope))
    }

    /// Private message scopes requested
    pub fn pm_scopes(&self) -> Vec<PmScope> {
        self.filters
            .iter()
            .filter_map(|f| match f {
                Filter::PrivateMessages { mode } => Some(*mode),
                _ => None,
            })
            .collect()
    }

    /// Whether any private message filter is present
    pub fn has_private_messages(&self) -> bool {
        self.filters.iter().any(|f| {
            matches!(
                f,
                Filter::PrivateMessages { .. } | Filter::Participant { .. }
            )
        })
    }

    /// Categories the query names explicitly
    pub fn named_categories(&self) -> BTreeSet<CategoryId> {
        self.filters
            .iter()
            .filter_map(|f| match f {
                Filter::Category { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
