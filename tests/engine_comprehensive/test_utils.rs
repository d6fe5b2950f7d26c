//! Test utilities for the engine comprehensive suite

use agora::{
    Category, CategoryId, Catalog, EntityRef, Identity, InvertedIndex, Post, PostId, ResultSet,
    SearchConfig, SearchEngine, SearchOptions, Topic, TopicId, TypeFilter, User, UserId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

/// Default category every fixture topic lands in
pub const GENERAL: CategoryId = CategoryId(1);

/// Route engine logs to the test output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Fixed reference time so date filters are reproducible
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Post id of `post_number` in fixture topic `topic`
pub fn post_id(topic: u64, post_number: u32) -> PostId {
    PostId(topic * 100 + u64::from(post_number))
}

/// A small forum built topic by topic
pub struct Forum {
    pub catalog: Arc<Catalog>,
}

impl Forum {
    /// A forum with one public category and one regular user
    pub fn new() -> Self {
        init_tracing();
        let catalog = Arc::new(Catalog::new());
        catalog.upsert_category(Category::new(GENERAL, "General", "general"));
        catalog.upsert_user(User::new(UserId(1), "author"));
        Forum { catalog }
    }

    /// Add a topic with a first post; `day` offsets creation from `base_time`
    pub fn topic(&self, id: u64, title: &str, body: &str, day: i64) -> Topic {
        let created = base_time() + Duration::days(day);
        let topic = Topic::new(TopicId(id), title, UserId(1))
            .with_category(GENERAL)
            .with_created_at(created);
        self.catalog.upsert_topic(topic.clone());
        self.reply(id, 1, body, day);
        topic
    }

    /// Add a post to an existing topic
    pub fn reply(&self, topic: u64, post_number: u32, body: &str, day: i64) -> PostId {
        let id = post_id(topic, post_number);
        self.catalog.upsert_post(
            Post::new(id, TopicId(topic), post_number, UserId(1), body)
                .with_created_at(base_time() + Duration::days(day)),
        );
        id
    }

    /// Replace a topic record
    pub fn update_topic(&self, topic: Topic) {
        self.catalog.upsert_topic(topic);
    }

    /// Build an engine and index everything
    pub fn engine(&self, config: SearchConfig) -> SearchEngine {
        let engine = SearchEngine::new(self.catalog.clone(), Arc::new(InvertedIndex::new()), config);
        engine.indexer().rebuild().unwrap();
        engine
    }
}

/// Full-page topic search options for an identity
pub fn topic_search(identity: Identity) -> SearchOptions {
    SearchOptions::new()
        .with_identity(identity)
        .with_type_filter(TypeFilter::Topic)
        .with_skip_cache()
}

/// Topic ids of post hits, in rank order
pub fn topic_ids(results: &ResultSet) -> Vec<u64> {
    results
        .posts
        .iter()
        .filter_map(|h| h.topic_id)
        .map(|t| t.get())
        .collect()
}

/// Post refs of a result set
pub fn post_refs(results: &ResultSet) -> Vec<EntityRef> {
    results.post_refs()
}
