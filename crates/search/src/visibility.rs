//! Visibility scoping
//!
//! `Guardian` answers "may this identity see X" by re-reading the current
//! user record and group memberships from the catalog on every request, so
//! a permission change applies to the very next search. The result of those
//! reads is frozen into a [`VisibilityScope`] for the duration of one
//! execution and is never shared across identities.
//!
//! Rules:
//! - Staff (admins and moderators) see every category, unlisted topics,
//!   hidden posts, whispers and staged users.
//! - Everyone else sees public categories plus read-restricted categories
//!   that grant any permission to one of their groups.
//! - Private messages are visible to participants: allowed users and
//!   members of allowed groups. Staff additionally see the messages they
//!   explicitly ask for with `personal_messages:` / `group_messages:`.
//! - Deleted content only appears under `status:deleted` (staff only).
//! - Small-action and moderator-action notices are never search results.

use crate::query::{Filter, FilterLookup, FilterSet, PmScope, TopicStatusFilter};
use agora_core::{
    Archetype, Badge, Category, CategoryId, Group, GroupId, GroupVisibility, Identity, Post,
    PostType, Result, SearchError, SearchOptions, Tag, Topic, TypeFilter, User, UserId,
};
use agora_store::Catalog;
use std::collections::BTreeSet;
use tracing::debug;

// ============================================================================
// VisibilityScope
// ============================================================================

/// Everything one execution may see
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityScope {
    /// Requesting identity
    pub identity: Identity,
    /// Resolved user; `None` for anonymous or unknown identities
    pub user_id: Option<UserId>,
    /// Admin or moderator
    pub is_staff: bool,
    /// Admin
    pub is_admin: bool,
    /// Groups the user belongs to
    pub group_ids: BTreeSet<GroupId>,
    /// Readable categories
    pub allowed_category_ids: BTreeSet<CategoryId>,
    /// Other users whose private messages staff asked to see
    pub can_see_private_messages_for: BTreeSet<UserId>,
    /// Groups whose messages staff asked to see
    pub can_see_group_messages_for: BTreeSet<GroupId>,
    /// Unlisted topics
    pub include_invisible: bool,
    /// Staged users in user results
    pub show_staged_users: bool,
    /// Whisper posts
    pub can_see_whispers: bool,
    /// Deleted posts and topics
    pub include_deleted: bool,
}

impl VisibilityScope {
    /// Whether the identity is logged in
    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether a category is readable
    pub fn allows_category(&self, id: CategoryId) -> bool {
        self.allowed_category_ids.contains(&id)
    }

    /// Whether the identity takes part in a private message
    pub fn participates(&self, topic: &Topic) -> bool {
        let Some(me) = self.user_id else {
            return false;
        };
        topic.allowed_users.contains(&me)
            || topic
                .allowed_groups
                .iter()
                .any(|g| self.group_ids.contains(g))
    }

    /// Whether a private message is visible
    pub fn allows_private_message(&self, topic: &Topic) -> bool {
        if self.participates(topic) {
            return true;
        }
        topic
            .allowed_users
            .iter()
            .any(|u| self.can_see_private_messages_for.contains(u))
            || topic
                .allowed_groups
                .iter()
                .any(|g| self.can_see_group_messages_for.contains(g))
    }

    /// Whether a topic is visible
    pub fn allows_topic(&self, topic: &Topic) -> bool {
        if topic.deleted && !self.include_deleted {
            return false;
        }
        if !topic.visible && !self.include_invisible {
            return false;
        }
        match topic.archetype {
            Archetype::PrivateMessage => self.allows_private_message(topic),
            Archetype::Regular => topic
                .category_id
                .map_or(true, |id| self.allows_category(id)),
        }
    }

    /// Whether a post of a visible topic is visible
    pub fn allows_post(&self, post: &Post, topic: &Topic) -> bool {
        if !self.allows_topic(topic) {
            return false;
        }
        if post.deleted && !self.include_deleted {
            return false;
        }
        if post.hidden && !self.is_staff {
            return false;
        }
        match post.post_type {
            PostType::Regular => true,
            PostType::Whisper => self.can_see_whispers,
            PostType::SmallAction | PostType::ModeratorAction => false,
        }
    }

    /// Whether a user may appear in user results
    pub fn allows_user(&self, user: &User) -> bool {
        if self.is_staff {
            return !user.staged || self.show_staged_users;
        }
        user.active && !user.suspended && !user.staged
    }

    /// Whether a group is visible
    pub fn allows_group(&self, group: &Group) -> bool {
        match group.visibility {
            GroupVisibility::Public => true,
            GroupVisibility::LoggedOnUsers => self.is_logged_in(),
            GroupVisibility::Members => self.is_staff || self.group_ids.contains(&group.id),
            GroupVisibility::Staff => self.is_staff,
        }
    }

    /// Whether a tag is visible
    pub fn allows_tag(&self, tag: &Tag) -> bool {
        !tag.staff_only || self.is_staff
    }
}

// ============================================================================
// Guardian
// ============================================================================

/// Permission checks for one identity
pub struct Guardian<'a> {
    catalog: &'a Catalog,
    identity: Identity,
}

impl<'a> Guardian<'a> {
    /// Create a guardian for an identity
    pub fn new(catalog: &'a Catalog, identity: Identity) -> Self {
        Guardian { catalog, identity }
    }

    /// Current user record; unknown ids behave as anonymous
    pub fn user(&self) -> Option<User> {
        self.identity.user_id().and_then(|id| self.catalog.user(id))
    }

    /// Whether a category is readable by a user in `group_ids`
    pub fn can_see_category(
        &self,
        category: &Category,
        is_staff: bool,
        group_ids: &BTreeSet<GroupId>,
    ) -> bool {
        is_staff
            || !category.read_restricted
            || category
                .permissions
                .iter()
                .any(|p| group_ids.contains(&p.group_id))
    }

    /// Base scope from the current catalog state
    pub fn scope(&self) -> VisibilityScope {
        let user = self.user();
        let user_id = user.as_ref().map(|u| u.id);
        let is_staff = user.as_ref().map_or(false, User::is_staff);
        let is_admin = user.as_ref().map_or(false, |u| u.admin);
        let group_ids = user_id
            .map(|id| self.catalog.group_ids_for(id))
            .unwrap_or_default();
        let allowed_category_ids = self
            .catalog
            .categories()
            .iter()
            .filter(|c| self.can_see_category(c, is_staff, &group_ids))
            .map(|c| c.id)
            .collect();
        VisibilityScope {
            identity: self.identity,
            user_id,
            is_staff,
            is_admin,
            group_ids,
            allowed_category_ids,
            can_see_private_messages_for: BTreeSet::new(),
            can_see_group_messages_for: BTreeSet::new(),
            include_invisible: is_staff,
            show_staged_users: is_staff,
            can_see_whispers: is_staff,
            include_deleted: false,
        }
    }

    /// Check the requested scopes and widen the scope where staff asked for it
    ///
    /// Fails with `AccessDenied` when an anonymous identity asks for private
    /// messages, or when a non-staff user asks for another user's or a
    /// foreign group's messages.
    pub fn authorize(
        &self,
        mut scope: VisibilityScope,
        options: &SearchOptions,
        filters: &FilterSet,
    ) -> Result<VisibilityScope> {
        let wants_messages = options.type_filter == TypeFilter::PrivateMessages
            || options.restrict_to_archetype == Some(Archetype::PrivateMessage)
            || filters.has_private_messages();
        if wants_messages && !scope.is_logged_in() {
            debug!("anonymous private message search denied");
            return Err(SearchError::access_denied(
                "private messages require a logged-in user",
            ));
        }

        for mode in filters.pm_scopes() {
            match mode {
                PmScope::OfUser(user_id) if Some(user_id) != scope.user_id => {
                    if !scope.is_staff {
                        return Err(SearchError::access_denied(
                            "cannot search another user's private messages",
                        ));
                    }
                    scope.can_see_private_messages_for.insert(user_id);
                }
                PmScope::OfGroup(group_id) if !scope.group_ids.contains(&group_id) => {
                    if !scope.is_staff {
                        return Err(SearchError::access_denied(
                            "cannot search messages of a group you are not in",
                        ));
                    }
                    scope.can_see_group_messages_for.insert(group_id);
                }
                _ => {}
            }
        }

        let wants_deleted = filters.iter().any(|f| {
            matches!(
                f,
                Filter::Status {
                    value: TopicStatusFilter::Deleted
                }
            )
        });
        if wants_deleted && scope.is_staff {
            scope.include_deleted = true;
        }
        Ok(scope)
    }
}

// ============================================================================
// ScopedLookup
// ============================================================================

/// Filter lookups that treat hidden entities as missing
pub struct ScopedLookup<'a> {
    catalog: &'a Catalog,
    scope: &'a VisibilityScope,
}

impl<'a> ScopedLookup<'a> {
    /// Wrap a catalog with a scope
    pub fn new(catalog: &'a Catalog, scope: &'a VisibilityScope) -> Self {
        ScopedLookup { catalog, scope }
    }

    fn visible(&self, category: Option<Category>) -> Option<Category> {
        category.filter(|c| self.scope.allows_category(c.id))
    }
}

impl FilterLookup for ScopedLookup<'_> {
    fn category_by_slug(&self, slug: &str, parent: Option<CategoryId>) -> Option<Category> {
        self.visible(self.catalog.category_by_slug(slug, parent))
    }

    fn categories_with_slug(&self, slug: &str) -> Vec<Category> {
        self.catalog
            .categories_with_slug(slug)
            .into_iter()
            .filter(|c| self.scope.allows_category(c.id))
            .collect()
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        self.visible(self.catalog.category(id))
    }

    fn tag_by_name(&self, name: &str) -> Option<Tag> {
        self.catalog
            .tag_by_name(name)
            .filter(|t| self.scope.allows_tag(t))
    }

    fn user_by_username(&self, username: &str) -> Option<User> {
        self.catalog.user_by_username(username)
    }

    fn user(&self, id: UserId) -> Option<User> {
        self.catalog.user(id)
    }

    fn group_by_name(&self, name: &str) -> Option<Group> {
        self.catalog
            .group_by_name(name)
            .filter(|g| self.scope.allows_group(g))
    }

    fn badge_by_name(&self, name: &str) -> Option<Badge> {
        self.catalog.badge_by_name(name)
    }
}
