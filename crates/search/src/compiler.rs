//! Index query compiler
//!
//! Turns a parsed [`Query`] plus the request's [`VisibilityScope`] into:
//! - a [`TextQuery`] for the full-text index (terms, phrases, fields),
//! - typed [`Predicate`]s evaluated against each candidate post,
//! - an optional [`DirectLookup`] for id and URL searches.
//!
//! Raw text is sanitized here: control characters and index syntax
//! characters become spaces before tokenization, so input can only ever
//! contribute plain terms. Predicates are values, never strings.

use crate::config::QueryConfig;
use crate::query::{
    AuthorRole, Comparison, CountField, DateDirection, Filter, OrderBy, PmScope, Query,
    ScopeFilter, TagMatch, TopicStatusFilter,
};
use crate::visibility::VisibilityScope;
use agora_core::{
    Archetype, BadgeId, CategoryId, NotificationLevel, Post, PostId, SearchContext,
    SearchOptions, SearchPriority, Topic, TopicId, TypeFilter, UserId,
};
use agora_store::{tokenize, Catalog, IndexField, IndexQuery};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Characters with meaning to index query syntaxes
const SYNTAX_CHARS: &[char] = &[
    '*', '(', ')', '{', '}', '[', ']', '^', '~', ':', '"', '\\', '|', '&', '!',
];

/// Replace control and index syntax characters with spaces
///
/// # Example
///
/// ```
/// use agora_search::compiler::sanitize;
///
/// assert_eq!(sanitize("a*(b)|c"), "a  b  c");
/// ```
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() || SYNTAX_CHARS.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

// ============================================================================
// Compiled forms
// ============================================================================

/// Free-text part of a compiled query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextQuery {
    /// Required terms, matched exactly or as prefix
    pub terms: Vec<String>,
    /// Required phrases, contiguous within one field
    pub phrases: Vec<Vec<String>>,
    /// Terms match as prefixes
    pub prefix: bool,
    /// Fields searched (empty = all)
    pub fields: Vec<IndexField>,
}

impl TextQuery {
    /// No terms and no phrases
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.phrases.is_empty()
    }

    /// Index request for this text
    pub fn to_index_query(&self) -> IndexQuery {
        let mut query = IndexQuery::new()
            .with_terms(self.terms.iter().cloned())
            .with_prefix(self.prefix)
            .with_fields(self.fields.clone());
        for phrase in &self.phrases {
            query = query.with_phrase(phrase.iter().cloned());
        }
        query
    }

    /// Every term and phrase token, for blurb highlighting
    pub fn highlight_terms(&self) -> Vec<String> {
        self.terms
            .iter()
            .chain(self.phrases.iter().flatten())
            .cloned()
            .collect()
    }
}

/// Search by id instead of by text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectLookup {
    /// A topic, optionally at a post number
    Topic {
        /// Topic id
        id: TopicId,
        /// Post number inside the topic
        post_number: Option<u32>,
    },
    /// A single post
    Post(PostId),
}

/// A typed restriction on candidate posts
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Nothing matches
    MatchNone,
    /// Visible to the request scope
    Visible,
    /// Topic archetype
    Archetype(Archetype),
    /// Post inside one topic
    InTopic(TopicId),
    /// Topic category in the set
    CategoryIn(BTreeSet<CategoryId>),
    /// Topic category not of `Ignore` priority unless exempt
    NotIgnored(BTreeSet<CategoryId>),
    /// Topic tags
    Tags {
        /// Lowercase names
        names: BTreeSet<String>,
        /// Any or all
        mode: TagMatch,
        /// Exclude instead of require
        negate: bool,
    },
    /// Post written by
    PostAuthor(UserId),
    /// Topic created by
    TopicCreator(UserId),
    /// Post author belongs to one of these users
    AuthorIn(BTreeSet<UserId>),
    /// Post author holds a badge
    AuthorHasBadge(BadgeId),
    /// Topic status
    Status(TopicStatusFilter),
    /// Post created strictly before
    CreatedBefore(DateTime<Utc>),
    /// Post created at or after
    CreatedSince(DateTime<Utc>),
    /// Lookup-free scope; personal scopes carry the identity
    Scope(ScopeFilter, Option<UserId>),
    /// Count bound
    Count(CountField, Comparison, u64),
    /// Upload with one of these extensions
    FileType(BTreeSet<String>),
    /// Private message scope
    PrivateMessages(PmScope),
    /// Private message including this user
    Participant(UserId),
}

/// What a predicate can consult while evaluating
pub struct EvalEnv<'a> {
    /// Entity lookups
    pub catalog: &'a Catalog,
    /// Request scope
    pub scope: &'a VisibilityScope,
}

impl Predicate {
    /// Evaluate against a post and its topic
    pub fn matches(&self, post: &Post, topic: &Topic, env: &EvalEnv<'_>) -> bool {
        match self {
            Predicate::MatchNone => false,
            Predicate::Visible => env.scope.allows_post(post, topic),
            Predicate::Archetype(archetype) => topic.archetype == *archetype,
            Predicate::InTopic(id) => topic.id == *id,
            Predicate::CategoryIn(ids) => topic.category_id.map_or(false, |id| ids.contains(&id)),
            Predicate::NotIgnored(exempt) => match topic.category_id {
                Some(id) if !exempt.contains(&id) => env
                    .catalog
                    .category(id)
                    .map_or(true, |c| c.search_priority != SearchPriority::Ignore),
                _ => true,
            },
            Predicate::Tags {
                names,
                mode,
                negate,
            } => {
                let tags: BTreeSet<String> = topic.tags.iter().map(|t| t.to_lowercase()).collect();
                let hit = match mode {
                    TagMatch::Any => names.iter().any(|n| tags.contains(n)),
                    TagMatch::All => names.iter().all(|n| tags.contains(n)),
                };
                hit != *negate
            }
            Predicate::PostAuthor(id) => post.user_id == *id,
            Predicate::TopicCreator(id) => topic.user_id == *id,
            Predicate::AuthorIn(ids) => ids.contains(&post.user_id),
            Predicate::AuthorHasBadge(id) => env.catalog.user_has_badge(post.user_id, *id),
            Predicate::Status(status) => match status {
                TopicStatusFilter::Open => !topic.closed && !topic.archived,
                TopicStatusFilter::Closed => topic.closed,
                TopicStatusFilter::Archived => topic.archived,
                TopicStatusFilter::NoReplies => topic.posts_count <= 1,
                TopicStatusFilter::Public => {
                    !topic.is_private_message()
                        && topic.category_id.map_or(true, |id| {
                            env.catalog
                                .category(id)
                                .map_or(false, |c| !c.read_restricted)
                        })
                }
                TopicStatusFilter::Deleted => post.deleted || topic.deleted,
            },
            Predicate::CreatedBefore(bound) => post.created_at < *bound,
            Predicate::CreatedSince(bound) => post.created_at >= *bound,
            Predicate::Scope(scope, me) => scope_matches(*scope, *me, post, topic, env.catalog),
            Predicate::Count(field, comparison, bound) => {
                let actual = match field {
                    CountField::PostsCount => u64::from(topic.posts_count),
                    CountField::Views => topic.views,
                    CountField::Likes => u64::from(post.like_count),
                };
                comparison.holds(actual, *bound)
            }
            Predicate::FileType(extensions) => post
                .upload_extensions
                .iter()
                .any(|e| extensions.contains(e)),
            Predicate::PrivateMessages(mode) => {
                topic.is_private_message()
                    && match mode {
                        PmScope::Participating => env.scope.participates(topic),
                        PmScope::Direct => {
                            topic.is_direct_message() && env.scope.participates(topic)
                        }
                        PmScope::OfUser(id) => topic.allowed_users.contains(id),
                        PmScope::OfGroup(id) => topic.allowed_groups.contains(id),
                    }
            }
            Predicate::Participant(id) => {
                topic.is_private_message() && topic.allowed_users.contains(id)
            }
        }
    }
}

fn scope_matches(
    scope: ScopeFilter,
    me: Option<UserId>,
    post: &Post,
    topic: &Topic,
    catalog: &Catalog,
) -> bool {
    let state = || me.and_then(|me| catalog.topic_user(me, topic.id));
    match scope {
        ScopeFilter::Pinned => topic.pinned,
        ScopeFilter::Unpinned => !topic.pinned,
        ScopeFilter::Wiki => post.wiki,
        ScopeFilter::Images => post.image_count > 0,
        ScopeFilter::Title | ScopeFilter::First => post.is_first_post(),
        ScopeFilter::Tagged => !topic.tags.is_empty(),
        ScopeFilter::Untagged => topic.tags.is_empty(),
        ScopeFilter::Seen => state().map_or(false, |s| s.last_read_post_number > 0),
        ScopeFilter::Unseen => state().map_or(true, |s| s.last_read_post_number == 0),
        ScopeFilter::Watching => {
            state().map_or(false, |s| s.notification_level == NotificationLevel::Watching)
        }
        ScopeFilter::Tracking => {
            state().map_or(false, |s| s.notification_level == NotificationLevel::Tracking)
        }
        ScopeFilter::Posted => state().map_or(false, |s| s.posted),
        ScopeFilter::Created => me == Some(topic.user_id),
        ScopeFilter::Likes => me.map_or(false, |me| catalog.user_liked(me, post.id)),
        ScopeFilter::Bookmarks => me.map_or(false, |me| catalog.user_bookmarked(me, post.id)),
    }
}

/// Output of the compiler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    /// Free text
    pub text: TextQuery,
    /// Restrictions on post candidates (AND)
    pub predicates: Vec<Predicate>,
    /// Id or URL lookup replacing the text search
    pub direct: Option<DirectLookup>,
    /// Explicit order
    pub order: Option<OrderBy>,
}

impl CompiledQuery {
    /// Whether a post passes every predicate
    pub fn matches_post(&self, post: &Post, topic: &Topic, env: &EvalEnv<'_>) -> bool {
        self.predicates.iter().all(|p| p.matches(post, topic, env))
    }

    /// Whether the compiled predicates can never match
    pub fn matches_nothing(&self) -> bool {
        self.predicates.contains(&Predicate::MatchNone)
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Compile a query for one request
pub fn compile(
    query: &Query,
    scope: &VisibilityScope,
    catalog: &Catalog,
    config: &QueryConfig,
    options: &SearchOptions,
) -> CompiledQuery {
    let compiler = Compiler {
        scope,
        catalog,
        config,
        options,
    };
    compiler.compile(query)
}

struct Compiler<'a> {
    scope: &'a VisibilityScope,
    catalog: &'a Catalog,
    config: &'a QueryConfig,
    options: &'a SearchOptions,
}

impl<'a> Compiler<'a> {
    fn compile(&self, query: &Query) -> CompiledQuery {
        let text = self.text_query(query);
        let mut predicates = vec![Predicate::Visible];

        match &query.context {
            Some(SearchContext::Topic(_)) => {}
            _ => predicates.push(Predicate::Archetype(self.archetype(query))),
        }

        let mut exempt = BTreeSet::new();
        if let Some(context) = &query.context {
            predicates.push(self.context_predicate(context, &mut exempt));
        }
        for filter in &query.filters {
            predicates.extend(self.filter_predicate(filter, &mut exempt));
        }
        if !text.is_empty() {
            predicates.push(Predicate::NotIgnored(exempt));
        }

        let direct = direct_lookup(&query.clean_term, self.options, self.config);
        let compiled = CompiledQuery {
            text,
            predicates,
            direct,
            order: query.filters.order(),
        };
        debug!(
            terms = compiled.text.terms.len(),
            phrases = compiled.text.phrases.len(),
            predicates = compiled.predicates.len(),
            direct = compiled.direct.is_some(),
            "compiled query"
        );
        compiled
    }

    fn text_query(&self, query: &Query) -> TextQuery {
        let mut text = TextQuery {
            prefix: true,
            ..TextQuery::default()
        };
        for token in &query.terms {
            match token.phrase_text() {
                Some(inner) => {
                    let phrase = tokenize(&sanitize(inner));
                    if !phrase.is_empty() {
                        text.phrases.push(phrase);
                    }
                }
                None => text.terms.extend(tokenize(&sanitize(&token.text))),
            }
        }
        if query.filters.has_scope(ScopeFilter::Title) {
            text.fields = vec![IndexField::Title];
        }
        text
    }

    fn archetype(&self, query: &Query) -> Archetype {
        if self.options.type_filter == TypeFilter::PrivateMessages
            || query.filters.has_private_messages()
        {
            Archetype::PrivateMessage
        } else {
            self.options
                .restrict_to_archetype
                .unwrap_or(Archetype::Regular)
        }
    }

    fn context_predicate(
        &self,
        context: &SearchContext,
        exempt: &mut BTreeSet<CategoryId>,
    ) -> Predicate {
        match context {
            SearchContext::Topic(id) => Predicate::InTopic(*id),
            SearchContext::Category(id) => {
                let ids = self.catalog.descendant_category_ids(*id);
                exempt.extend(ids.iter().copied());
                Predicate::CategoryIn(ids)
            }
            SearchContext::Tag(name) => Predicate::Tags {
                names: BTreeSet::from([name.to_lowercase()]),
                mode: TagMatch::Any,
                negate: false,
            },
            SearchContext::UserProfile(id) => Predicate::PostAuthor(*id),
        }
    }

    /// Restriction for one filter; ordering filters restrict nothing
    fn filter_predicate(
        &self,
        filter: &Filter,
        exempt: &mut BTreeSet<CategoryId>,
    ) -> Option<Predicate> {
        let me = self.scope.user_id;
        let predicate = match filter {
            Filter::Tag {
                names,
                mode,
                negate,
            } => Predicate::Tags {
                names: names.clone(),
                mode: *mode,
                negate: *negate,
            },
            Filter::Category { exact, id, .. } => {
                let ids = if *exact {
                    BTreeSet::from([*id])
                } else {
                    self.catalog.descendant_category_ids(*id)
                };
                exempt.extend(ids.iter().copied());
                Predicate::CategoryIn(ids)
            }
            Filter::User { role, id, .. } => match role {
                AuthorRole::PostAuthor => Predicate::PostAuthor(*id),
                AuthorRole::TopicCreator => Predicate::TopicCreator(*id),
            },
            Filter::Status { value } => Predicate::Status(*value),
            Filter::DateBound { direction, value } => {
                let bound = start_of_day(*value);
                match direction {
                    DateDirection::Before => Predicate::CreatedBefore(bound),
                    DateDirection::After => Predicate::CreatedSince(bound),
                }
            }
            Filter::Order { .. } => return None,
            Filter::Scope { value } => {
                if value.is_personal() && me.is_none() {
                    Predicate::MatchNone
                } else {
                    Predicate::Scope(*value, me)
                }
            }
            Filter::Count {
                field,
                comparison,
                value,
            } => Predicate::Count(*field, *comparison, *value),
            Filter::Group { id, .. } => Predicate::AuthorIn(self.catalog.group_members(*id)),
            Filter::Badge { id, .. } => Predicate::AuthorHasBadge(*id),
            Filter::FileType { extensions } => Predicate::FileType(extensions.clone()),
            Filter::PrivateMessages { mode } => match (mode, me) {
                (_, None) => Predicate::MatchNone,
                (mode, Some(_)) => Predicate::PrivateMessages(*mode),
            },
            Filter::Participant { id } => Predicate::Participant(*id),
        };
        Some(predicate)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

// ============================================================================
// Direct lookups
// ============================================================================

/// Detect an id or URL search
///
/// With `search_for_id`, an all-digit term names a topic. A topic or post
/// URL (`/t/<slug>/<id>[/<n>]`, `/t/<id>[/<n>]`, `/p/<id>`) names it
/// directly; absolute URLs must point at the configured base host.
pub fn direct_lookup(
    clean_term: &str,
    options: &SearchOptions,
    config: &QueryConfig,
) -> Option<DirectLookup> {
    let term = clean_term.trim();
    if term.is_empty() || term.contains(char::is_whitespace) {
        return None;
    }
    if options.search_for_id && term.chars().all(|c| c.is_ascii_digit()) {
        return Some(DirectLookup::Topic {
            id: TopicId(term.parse().ok()?),
            post_number: None,
        });
    }
    let path = if let Some(rest) = strip_scheme(term) {
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        let expected = config.base_url.as_deref().and_then(base_host)?;
        if !host.eq_ignore_ascii_case(expected) {
            return None;
        }
        path
    } else {
        term.strip_prefix('/')?
    };
    parse_path(path)
}

fn strip_scheme(url: &str) -> Option<&str> {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
}

fn base_host(base_url: &str) -> Option<&str> {
    let rest = strip_scheme(base_url).unwrap_or(base_url);
    rest.split('/').next().filter(|h| !h.is_empty())
}

fn parse_path(path: &str) -> Option<DirectLookup> {
    let path = path.split(|c| c == '?' || c == '#').next().unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let number = |s: &str| -> Option<u64> {
        if s.chars().all(|c| c.is_ascii_digit()) {
            s.parse().ok()
        } else {
            None
        }
    };
    match segments.as_slice() {
        ["p", id] => Some(DirectLookup::Post(PostId(number(*id)?))),
        ["t", first, rest @ ..] => {
            let (id, tail) = match number(*first) {
                Some(id) => (id, rest),
                None => {
                    let (id, tail) = rest.split_first()?;
                    (number(*id)?, tail)
                }
            };
            let post_number = match tail {
                [] => None,
                [n] => Some(u32::try_from(number(*n)?).ok()?),
                _ => return None,
            };
            Some(DirectLookup::Topic {
                id: TopicId(id),
                post_number,
            })
        }
        _ => None,
    }
}
