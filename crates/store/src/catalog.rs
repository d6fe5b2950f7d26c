//! In-memory entity catalog
//!
//! The catalog is the source of truth the search engine reads entities and
//! per-user state from. The full-text index only returns `EntityRef`s; the
//! searchers resolve each ref here, so an index hit whose entity has since
//! disappeared is simply skipped.
//!
//! # Thread Safety
//!
//! Every table is a `DashMap`. Never hold a reference into one table while
//! mutating the same table.

use agora_core::{
    Badge, BadgeId, Category, CategoryId, Group, GroupId, Post, PostId, Tag, TagId, Topic,
    TopicId, TopicUserState, User, UserId,
};
use dashmap::{DashMap, DashSet};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Entity store with the lookups the filter grammar and guardian need
#[derive(Default)]
pub struct Catalog {
    categories: DashMap<CategoryId, Category>,
    topics: DashMap<TopicId, Topic>,
    posts: DashMap<PostId, Post>,
    /// topic -> post_number -> post
    topic_posts: DashMap<TopicId, BTreeMap<u32, PostId>>,
    users: DashMap<UserId, User>,
    tags: DashMap<TagId, Tag>,
    groups: DashMap<GroupId, Group>,
    badges: DashMap<BadgeId, Badge>,
    group_members: DashMap<GroupId, BTreeSet<UserId>>,
    user_badges: DashMap<UserId, BTreeSet<BadgeId>>,
    topic_users: DashMap<(UserId, TopicId), TopicUserState>,
    likes: DashSet<(UserId, PostId)>,
    bookmarks: DashSet<(UserId, PostId)>,
    version: AtomicU64,
}

fn sorted_values<K: Ord + Copy + std::hash::Hash + Eq, V: Clone>(map: &DashMap<K, V>) -> Vec<V> {
    let mut entries: Vec<(K, V)> = map.iter().map(|r| (*r.key(), r.value().clone())).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutation counter, bumped on every write
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::Release);
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Insert or replace a category
    pub fn upsert_category(&self, category: Category) {
        self.categories.insert(category.id, category);
        self.bump();
    }

    /// Get a category
    pub fn category(&self, id: CategoryId) -> Option<Category> {
        self.categories.get(&id).map(|c| c.value().clone())
    }

    /// All categories, by id
    pub fn categories(&self) -> Vec<Category> {
        sorted_values(&self.categories)
    }

    /// Category with `slug` (case-insensitive) directly under `parent`
    ///
    /// `parent: None` only matches top-level categories.
    pub fn category_by_slug(&self, slug: &str, parent: Option<CategoryId>) -> Option<Category> {
        self.categories()
            .into_iter()
            .find(|c| c.parent_id == parent && c.slug.eq_ignore_ascii_case(slug))
    }

    /// Every category with `slug` at any depth, by id
    pub fn categories_with_slug(&self, slug: &str) -> Vec<Category> {
        self.categories()
            .into_iter()
            .filter(|c| c.slug.eq_ignore_ascii_case(slug))
            .collect()
    }

    /// `id` and every category below it
    pub fn descendant_category_ids(&self, id: CategoryId) -> BTreeSet<CategoryId> {
        let all = self.categories();
        let mut result = BTreeSet::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            if !result.insert(current) {
                continue;
            }
            frontier.extend(
                all.iter()
                    .filter(|c| c.parent_id == Some(current))
                    .map(|c| c.id),
            );
        }
        result
    }

    // ========================================================================
    // Topics and posts
    // ========================================================================

    /// Insert or replace a topic; post and like counts are recomputed
    pub fn upsert_topic(&self, topic: Topic) {
        let id = topic.id;
        self.topics.insert(id, topic);
        self.refresh_topic_counts(id);
        self.bump();
    }

    /// Get a topic
    pub fn topic(&self, id: TopicId) -> Option<Topic> {
        self.topics.get(&id).map(|t| t.value().clone())
    }

    /// All topics, by id
    pub fn topics(&self) -> Vec<Topic> {
        sorted_values(&self.topics)
    }

    /// Insert or replace a post
    pub fn upsert_post(&self, post: Post) {
        let (id, topic_id, number) = (post.id, post.topic_id, post.post_number);
        if let Some(previous) = self.posts.insert(id, post) {
            if previous.topic_id != topic_id || previous.post_number != number {
                if let Some(mut numbers) = self.topic_posts.get_mut(&previous.topic_id) {
                    numbers.remove(&previous.post_number);
                }
                self.refresh_topic_counts(previous.topic_id);
            }
        }
        self.topic_posts
            .entry(topic_id)
            .or_default()
            .insert(number, id);
        self.refresh_topic_counts(topic_id);
        self.bump();
    }

    /// Get a post
    pub fn post(&self, id: PostId) -> Option<Post> {
        self.posts.get(&id).map(|p| p.value().clone())
    }

    /// All posts, by id
    pub fn posts(&self) -> Vec<Post> {
        sorted_values(&self.posts)
    }

    /// Post ids of a topic, by post number
    pub fn topic_post_ids(&self, topic_id: TopicId) -> Vec<PostId> {
        self.topic_posts
            .get(&topic_id)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default()
    }

    /// Post at `post_number` inside a topic
    pub fn post_by_number(&self, topic_id: TopicId, post_number: u32) -> Option<Post> {
        let id = self
            .topic_posts
            .get(&topic_id)
            .and_then(|m| m.get(&post_number).copied())?;
        self.post(id)
    }

    fn refresh_topic_counts(&self, topic_id: TopicId) {
        let ids = self.topic_post_ids(topic_id);
        let mut posts_count = 0u32;
        let mut like_count = 0u32;
        for id in ids {
            if let Some(post) = self.posts.get(&id) {
                if !post.deleted {
                    posts_count += 1;
                    like_count += post.like_count;
                }
            }
        }
        if let Some(mut topic) = self.topics.get_mut(&topic_id) {
            topic.posts_count = posts_count;
            topic.like_count = like_count;
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert or replace a user
    pub fn upsert_user(&self, user: User) {
        self.users.insert(user.id, user);
        self.bump();
    }

    /// Get a user
    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    /// Look up a user by username, case-insensitively
    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .map(|u| u.value().clone())
    }

    /// All users, by id
    pub fn users(&self) -> Vec<User> {
        sorted_values(&self.users)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Insert or replace a tag
    pub fn upsert_tag(&self, tag: Tag) {
        self.tags.insert(tag.id, tag);
        self.bump();
    }

    /// Get a tag
    pub fn tag(&self, id: TagId) -> Option<Tag> {
        self.tags.get(&id).map(|t| t.value().clone())
    }

    /// Look up a tag by name, case-insensitively
    pub fn tag_by_name(&self, name: &str) -> Option<Tag> {
        let name = name.to_lowercase();
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value().clone())
    }

    /// All tags, by id
    pub fn tags(&self) -> Vec<Tag> {
        sorted_values(&self.tags)
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Insert or replace a group
    pub fn upsert_group(&self, group: Group) {
        self.groups.insert(group.id, group);
        self.bump();
    }

    /// Get a group
    pub fn group(&self, id: GroupId) -> Option<Group> {
        self.groups.get(&id).map(|g| g.value().clone())
    }

    /// Look up a group by name, case-insensitively
    pub fn group_by_name(&self, name: &str) -> Option<Group> {
        self.groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
            .map(|g| g.value().clone())
    }

    /// All groups, by id
    pub fn groups(&self) -> Vec<Group> {
        sorted_values(&self.groups)
    }

    /// Add a user to a group
    pub fn add_group_member(&self, group_id: GroupId, user_id: UserId) {
        self.group_members
            .entry(group_id)
            .or_default()
            .insert(user_id);
        self.bump();
    }

    /// Remove a user from a group
    pub fn remove_group_member(&self, group_id: GroupId, user_id: UserId) {
        if let Some(mut members) = self.group_members.get_mut(&group_id) {
            members.remove(&user_id);
        }
        self.bump();
    }

    /// Members of a group
    pub fn group_members(&self, group_id: GroupId) -> BTreeSet<UserId> {
        self.group_members
            .get(&group_id)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    /// Groups a user belongs to
    pub fn group_ids_for(&self, user_id: UserId) -> BTreeSet<GroupId> {
        self.group_members
            .iter()
            .filter(|entry| entry.value().contains(&user_id))
            .map(|entry| *entry.key())
            .collect()
    }

    // ========================================================================
    // Badges
    // ========================================================================

    /// Insert or replace a badge
    pub fn upsert_badge(&self, badge: Badge) {
        self.badges.insert(badge.id, badge);
        self.bump();
    }

    /// Look up a badge by name, case-insensitively
    pub fn badge_by_name(&self, name: &str) -> Option<Badge> {
        self.badges
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| b.value().clone())
    }

    /// Grant a badge to a user
    pub fn grant_badge(&self, user_id: UserId, badge_id: BadgeId) {
        self.user_badges
            .entry(user_id)
            .or_default()
            .insert(badge_id);
        self.bump();
    }

    /// Whether a user holds a badge
    pub fn user_has_badge(&self, user_id: UserId, badge_id: BadgeId) -> bool {
        self.user_badges
            .get(&user_id)
            .map_or(false, |b| b.contains(&badge_id))
    }

    // ========================================================================
    // Per-user state
    // ========================================================================

    /// Record a user's state for a topic
    pub fn set_topic_user(&self, user_id: UserId, topic_id: TopicId, state: TopicUserState) {
        self.topic_users.insert((user_id, topic_id), state);
        self.bump();
    }

    /// A user's state for a topic, if the user ever opened it
    pub fn topic_user(&self, user_id: UserId, topic_id: TopicId) -> Option<TopicUserState> {
        self.topic_users.get(&(user_id, topic_id)).map(|s| *s)
    }

    /// Record a like; the post's and topic's like counts follow
    pub fn like_post(&self, user_id: UserId, post_id: PostId) {
        if !self.likes.insert((user_id, post_id)) {
            return;
        }
        let topic_id = match self.posts.get_mut(&post_id) {
            Some(mut post) => {
                post.like_count += 1;
                Some(post.topic_id)
            }
            None => None,
        };
        if let Some(topic_id) = topic_id {
            self.refresh_topic_counts(topic_id);
        }
        self.bump();
    }

    /// Whether a user liked a post
    pub fn user_liked(&self, user_id: UserId, post_id: PostId) -> bool {
        self.likes.contains(&(user_id, post_id))
    }

    /// Record a bookmark
    pub fn bookmark_post(&self, user_id: UserId, post_id: PostId) {
        self.bookmarks.insert((user_id, post_id));
        self.bump();
    }

    /// Whether a user bookmarked a post
    pub fn user_bookmarked(&self, user_id: UserId, post_id: PostId) -> bool {
        self.bookmarks.contains(&(user_id, post_id))
    }
}
