//! Filter extraction
//!
//! One left-to-right fold over the lexed tokens. Each unquoted token is
//! tried against the filter grammar; a match appends a typed [`Filter`] and
//! drops the token, anything else (unknown key, unknown value, lookup miss,
//! unparsable date or number) stays in the free text unchanged.
//!
//! Lookups go through [`FilterLookup`] so callers can hide entities the
//! requesting identity may not see: a hidden category resolves exactly like
//! a missing one.

use super::dates::parse_date;
use super::filters::{
    AuthorRole, Comparison, CountField, DateDirection, Filter, FilterSet, OrderBy, PmScope,
    ScopeFilter, TagMatch, TopicStatusFilter, UserIdentifier,
};
use super::lexer::QueryToken;
use agora_core::{Badge, Category, CategoryId, Group, Identity, Tag, User, UserId};
use agora_store::Catalog;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

// ============================================================================
// Lookup seam
// ============================================================================

/// Entity lookups used while resolving filter values
pub trait FilterLookup {
    /// Category with `slug` directly under `parent` (None = top level)
    fn category_by_slug(&self, slug: &str, parent: Option<CategoryId>) -> Option<Category>;
    /// Every category with `slug`, by id
    fn categories_with_slug(&self, slug: &str) -> Vec<Category>;
    /// Category by id
    fn category(&self, id: CategoryId) -> Option<Category>;
    /// Tag by name
    fn tag_by_name(&self, name: &str) -> Option<Tag>;
    /// User by username
    fn user_by_username(&self, username: &str) -> Option<User>;
    /// User by id
    fn user(&self, id: UserId) -> Option<User>;
    /// Group by name
    fn group_by_name(&self, name: &str) -> Option<Group>;
    /// Badge by name
    fn badge_by_name(&self, name: &str) -> Option<Badge>;
}

/// Unscoped lookups straight against the catalog
impl FilterLookup for Catalog {
    fn category_by_slug(&self, slug: &str, parent: Option<CategoryId>) -> Option<Category> {
        Catalog::category_by_slug(self, slug, parent)
    }

    fn categories_with_slug(&self, slug: &str) -> Vec<Category> {
        Catalog::categories_with_slug(self, slug)
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        Catalog::category(self, id)
    }

    fn tag_by_name(&self, name: &str) -> Option<Tag> {
        Catalog::tag_by_name(self, name)
    }

    fn user_by_username(&self, username: &str) -> Option<User> {
        Catalog::user_by_username(self, username)
    }

    fn user(&self, id: UserId) -> Option<User> {
        Catalog::user(self, id)
    }

    fn group_by_name(&self, name: &str) -> Option<Group> {
        Catalog::group_by_name(self, name)
    }

    fn badge_by_name(&self, name: &str) -> Option<Badge> {
        Catalog::badge_by_name(self, name)
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Request facts the grammar depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractContext {
    /// Requesting identity (`@me`)
    pub identity: Identity,
    /// Staff-only values (`status:deleted`) are accepted
    pub is_staff: bool,
    /// Anchor for relative dates
    pub today: NaiveDate,
}

/// Result of extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Filters in token order
    pub filters: FilterSet,
    /// Tokens left as free text, in order
    pub remaining: Vec<QueryToken>,
}

/// Fold tokens into filters and remaining free text
pub fn extract(
    tokens: Vec<QueryToken>,
    lookup: &dyn FilterLookup,
    ctx: &ExtractContext,
) -> Extraction {
    let extractor = Extractor { lookup, ctx };
    let mut out = Extraction::default();
    for token in tokens {
        let parsed = if token.quoted {
            None
        } else {
            extractor.parse(&token.text)
        };
        match parsed {
            Some(filter) => {
                debug!(token = %token.text, filter = filter.name(), "extracted filter");
                out.filters.push(filter);
            }
            None => out.remaining.push(token),
        }
    }
    out
}

struct Extractor<'a> {
    lookup: &'a dyn FilterLookup,
    ctx: &'a ExtractContext,
}

impl<'a> Extractor<'a> {
    fn parse(&self, text: &str) -> Option<Filter> {
        match text {
            "l" => {
                return Some(Filter::Order {
                    value: OrderBy::Latest,
                })
            }
            "t" => {
                return Some(Filter::Scope {
                    value: ScopeFilter::Title,
                })
            }
            "f" => {
                return Some(Filter::Scope {
                    value: ScopeFilter::First,
                })
            }
            _ => {}
        }
        if let Some(rest) = text.strip_prefix('#') {
            return self.category_or_tag(rest);
        }
        if let Some(rest) = text.strip_prefix('@') {
            return self.user(rest, AuthorRole::PostAuthor);
        }
        let (key, value) = text.split_once(':')?;
        if value.is_empty() {
            return None;
        }
        let key = key.to_lowercase();
        match key.as_str() {
            "tags" | "tag" => self.tags(value, false),
            "-tags" | "-tag" => self.tags(value, true),
            "category" | "categories" => self.category(value),
            "user" => self.user(value.strip_prefix('@').unwrap_or(value), AuthorRole::PostAuthor),
            "created" => self.user(value.strip_prefix('@')?, AuthorRole::TopicCreator),
            "in" => self.in_scope(&value.to_lowercase()),
            "with" => self.with(value),
            "personal_messages" => {
                let user = self.resolve_user(value.strip_prefix('@').unwrap_or(value))?;
                Some(Filter::PrivateMessages {
                    mode: PmScope::OfUser(user.1),
                })
            }
            "group_messages" => {
                let group = self.lookup.group_by_name(value)?;
                Some(Filter::PrivateMessages {
                    mode: PmScope::OfGroup(group.id),
                })
            }
            "before" => self.date(value, DateDirection::Before),
            "after" => self.date(value, DateDirection::After),
            "status" => {
                let status = TopicStatusFilter::from_name(&value.to_lowercase())?;
                if status == TopicStatusFilter::Deleted && !self.ctx.is_staff {
                    return None;
                }
                Some(Filter::Status { value: status })
            }
            "order" => OrderBy::from_name(&value.to_lowercase()).map(|value| Filter::Order { value }),
            "posts_count" => count(CountField::PostsCount, Comparison::Exact, value),
            "min_post_count" | "min_posts" => count(CountField::PostsCount, Comparison::Min, value),
            "max_posts" => count(CountField::PostsCount, Comparison::Max, value),
            "min_views" => count(CountField::Views, Comparison::Min, value),
            "max_views" => count(CountField::Views, Comparison::Max, value),
            "min_likes" => count(CountField::Likes, Comparison::Min, value),
            "group" => {
                let group = self.lookup.group_by_name(value)?;
                Some(Filter::Group {
                    name: value.to_string(),
                    id: group.id,
                })
            }
            "badge" => {
                let badge = self.lookup.badge_by_name(value)?;
                Some(Filter::Badge {
                    name: value.to_string(),
                    id: badge.id,
                })
            }
            "filetype" => filetype(value),
            _ => None,
        }
    }

    /// `#value`: a category slug first, then a tag name
    fn category_or_tag(&self, value: &str) -> Option<Filter> {
        if value.is_empty() {
            return None;
        }
        if let Some(filter) = self.category(value) {
            return Some(filter);
        }
        if value.contains(':') || value.starts_with('=') {
            return None;
        }
        let tag = self.lookup.tag_by_name(value)?;
        Some(Filter::Tag {
            names: BTreeSet::from([tag.name]),
            mode: TagMatch::Any,
            negate: false,
        })
    }

    /// `slug`, `id`, `=slug`, `parent:child`
    fn category(&self, value: &str) -> Option<Filter> {
        let (exact, value) = match value.strip_prefix('=') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let slug_path: Vec<String> = value.split(':').map(str::to_lowercase).collect();
        if slug_path.iter().any(String::is_empty) || slug_path.len() > 2 {
            return None;
        }
        let category = match slug_path.as_slice() {
            [single] => self.single_category(single)?,
            [parent, child] => {
                let parent = self.single_category(parent)?;
                self.lookup.category_by_slug(child, Some(parent.id))?
            }
            _ => return None,
        };
        Some(Filter::Category {
            slug_path,
            exact,
            id: category.id,
        })
    }

    /// Top-level slug first, then any visible category with that slug, then an id
    fn single_category(&self, slug: &str) -> Option<Category> {
        if let Some(top) = self.lookup.category_by_slug(slug, None) {
            return Some(top);
        }
        if let Some(first) = self.lookup.categories_with_slug(slug).into_iter().next() {
            return Some(first);
        }
        if slug.chars().all(|c| c.is_ascii_digit()) {
            let id: u64 = slug.parse().ok()?;
            return self.lookup.category(CategoryId(id));
        }
        None
    }

    fn tags(&self, value: &str, negate: bool) -> Option<Filter> {
        let (mode, separator) = if value.contains('+') {
            (TagMatch::All, '+')
        } else {
            (TagMatch::Any, ',')
        };
        let names: BTreeSet<String> = value
            .split(separator)
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        let any_exists = names.iter().any(|n| self.lookup.tag_by_name(n).is_some());
        if !any_exists {
            return None;
        }
        Some(Filter::Tag {
            names,
            mode,
            negate,
        })
    }

    /// Resolve a user reference to `(identifier, id)`
    fn resolve_user(&self, value: &str) -> Option<(UserIdentifier, UserId)> {
        if value.eq_ignore_ascii_case("me") {
            let id = self.ctx.identity.user_id()?;
            return Some((UserIdentifier::Me, id));
        }
        if let Some(user) = self.lookup.user_by_username(value) {
            return Some((UserIdentifier::Username(user.username), user.id));
        }
        if value.chars().all(|c| c.is_ascii_digit()) {
            let user = self.lookup.user(UserId(value.parse().ok()?))?;
            return Some((UserIdentifier::Id(user.id), user.id));
        }
        None
    }

    fn user(&self, value: &str, role: AuthorRole) -> Option<Filter> {
        if value.is_empty() {
            return None;
        }
        let (identifier, id) = self.resolve_user(value)?;
        Some(Filter::User {
            identifier,
            role,
            id,
        })
    }

    fn in_scope(&self, value: &str) -> Option<Filter> {
        match value {
            "personal" | "messages" => Some(Filter::PrivateMessages {
                mode: PmScope::Participating,
            }),
            "personal-direct" => Some(Filter::PrivateMessages {
                mode: PmScope::Direct,
            }),
            other => ScopeFilter::from_in(other).map(|value| Filter::Scope { value }),
        }
    }

    fn with(&self, value: &str) -> Option<Filter> {
        if value.eq_ignore_ascii_case("images") {
            return Some(Filter::Scope {
                value: ScopeFilter::Images,
            });
        }
        let (_, id) = self.resolve_user(value.strip_prefix('@')?)?;
        Some(Filter::Participant { id })
    }

    fn date(&self, value: &str, direction: DateDirection) -> Option<Filter> {
        let value = parse_date(value, self.ctx.today)?;
        Some(Filter::DateBound { direction, value })
    }
}

fn count(field: CountField, comparison: Comparison, value: &str) -> Option<Filter> {
    let value: u64 = value.parse().ok()?;
    Some(Filter::Count {
        field,
        comparison,
        value,
    })
}

fn filetype(value: &str) -> Option<Filter> {
    let extensions: BTreeSet<String> = value
        .split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .collect();
    if extensions.is_empty() {
        return None;
    }
    Some(Filter::FileType { extensions })
}
