//! Derives searchable payloads from catalog entities
//!
//! Every post document repeats its topic's title, category name and tags so
//! that a title hit can be attributed to any post of the topic and the ranker
//! can pick the best one. Because `FullTextIndex::index` replaces by
//! `EntityRef`, re-running any `index_*` call is harmless.

use crate::catalog::Catalog;
use crate::index::{FullTextIndex, IndexDocument, IndexField};
use agora_core::{
    Category, CategoryId, EntityRef, Group, GroupId, Post, PostId, Result, SearchError, Tag,
    TagId, Topic, TopicId, User, UserId,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Build the index document of a post
pub fn post_document(post: &Post, topic: &Topic, category: Option<&Category>) -> IndexDocument {
    let mut doc = IndexDocument::new(EntityRef::post(post.id))
        .with_field(IndexField::Title, topic.title.as_str())
        .with_field(IndexField::Body, post.raw.as_str());
    if let Some(category) = category {
        doc = doc.with_field(IndexField::Category, category.name.as_str());
    }
    if !topic.tags.is_empty() {
        doc = doc.with_field(IndexField::Tags, topic.tags.join(" "));
    }
    doc
}

/// Build the index document of a user
pub fn user_document(user: &User) -> IndexDocument {
    let mut doc = IndexDocument::new(EntityRef::user(user.id))
        .with_field(IndexField::Title, user.username.as_str());
    if let Some(name) = &user.name {
        doc = doc.with_field(IndexField::Body, name.as_str());
    }
    doc
}

/// Build the index document of a category
pub fn category_document(category: &Category) -> IndexDocument {
    let mut doc = IndexDocument::new(EntityRef::category(category.id))
        .with_field(IndexField::Title, category.name.as_str())
        .with_field(IndexField::Body, category.slug.as_str());
    if let Some(description) = &category.description {
        doc = doc.with_field(IndexField::Body, description.as_str());
    }
    doc
}

/// Build the index document of a tag
pub fn tag_document(tag: &Tag) -> IndexDocument {
    IndexDocument::new(EntityRef::tag(tag.id)).with_field(IndexField::Title, tag.name.as_str())
}

/// Build the index document of a group
pub fn group_document(group: &Group) -> IndexDocument {
    let mut doc = IndexDocument::new(EntityRef::group(group.id))
        .with_field(IndexField::Title, group.name.as_str());
    if let Some(full_name) = &group.full_name {
        doc = doc.with_field(IndexField::Body, full_name.as_str());
    }
    doc
}

/// Keeps the full-text index in step with the catalog
pub struct Indexer {
    catalog: Arc<Catalog>,
    index: Arc<dyn FullTextIndex>,
}

impl Indexer {
    /// Create an indexer over a catalog and an index
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn FullTextIndex>) -> Self {
        Indexer { catalog, index }
    }

    /// Index (or re-index) one post
    pub fn index_post(&self, id: PostId) -> Result<()> {
        let post = self
            .catalog
            .post(id)
            .ok_or_else(|| SearchError::not_found(format!("post {}", id)))?;
        let topic = self
            .catalog
            .topic(post.topic_id)
            .ok_or_else(|| SearchError::not_found(format!("topic {}", post.topic_id)))?;
        let category = topic.category_id.and_then(|c| self.catalog.category(c));
        self.index
            .index(post_document(&post, &topic, category.as_ref()))
    }

    /// Re-index every post of a topic; returns the number of posts indexed
    ///
    /// Call after a title, category or tag change.
    pub fn index_topic(&self, id: TopicId) -> Result<usize> {
        if self.catalog.topic(id).is_none() {
            return Err(SearchError::not_found(format!("topic {}", id)));
        }
        let ids = self.catalog.topic_post_ids(id);
        for post_id in &ids {
            self.index_post(*post_id)?;
        }
        debug!(topic = %id, posts = ids.len(), "reindexed topic");
        Ok(ids.len())
    }

    /// Index (or re-index) one user
    pub fn index_user(&self, id: UserId) -> Result<()> {
        let user = self
            .catalog
            .user(id)
            .ok_or_else(|| SearchError::not_found(format!("user {}", id)))?;
        self.index.index(user_document(&user))
    }

    /// Index (or re-index) one category
    pub fn index_category(&self, id: CategoryId) -> Result<()> {
        let category = self
            .catalog
            .category(id)
            .ok_or_else(|| SearchError::not_found(format!("category {}", id)))?;
        self.index.index(category_document(&category))
    }

    /// Index (or re-index) one tag
    pub fn index_tag(&self, id: TagId) -> Result<()> {
        let tag = self
            .catalog
            .tag(id)
            .ok_or_else(|| SearchError::not_found(format!("tag {}", id)))?;
        self.index.index(tag_document(&tag))
    }

    /// Index (or re-index) one group
    pub fn index_group(&self, id: GroupId) -> Result<()> {
        let group = self
            .catalog
            .group(id)
            .ok_or_else(|| SearchError::not_found(format!("group {}", id)))?;
        self.index.index(group_document(&group))
    }

    /// Remove an entity from the index
    pub fn remove(&self, entity: &EntityRef) -> Result<()> {
        self.index.remove(entity)
    }

    /// Index every entity in the catalog; returns the number of documents
    pub fn rebuild(&self) -> Result<usize> {
        let mut count = 0;
        for post in self.catalog.posts() {
            let Some(topic) = self.catalog.topic(post.topic_id) else {
                debug!(post = %post.id, "skipping post without topic");
                continue;
            };
            let category = topic.category_id.and_then(|c| self.catalog.category(c));
            self.index
                .index(post_document(&post, &topic, category.as_ref()))?;
            count += 1;
        }
        for user in self.catalog.users() {
            self.index.index(user_document(&user))?;
            count += 1;
        }
        for category in self.catalog.categories() {
            self.index.index(category_document(&category))?;
            count += 1;
        }
        for tag in self.catalog.tags() {
            self.index.index(tag_document(&tag))?;
            count += 1;
        }
        for group in self.catalog.groups() {
            self.index.index(group_document(&group))?;
            count += 1;
        }
        info!(documents = count, "search index rebuilt");
        Ok(count)
    }
}
