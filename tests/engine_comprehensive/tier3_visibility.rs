//! Tier 3: Visibility
//!
//! Restricted categories, private messages and hidden accounts never reach
//! someone who may not see them, whatever the query asks for.

use super::test_utils::*;
use agora::{
    Category, CategoryId, EntityRef, Group, GroupId, Identity, PermissionType, SearchConfig,
    SearchEngine, SearchError, SearchOptions, Topic, TopicId, TypeFilter, User, UserId,
};

const INSIDER: UserId = UserId(2);
const STRANGER: UserId = UserId(3);
const ROOT: UserId = UserId(4);
const BANNED: UserId = UserId(5);
const INSIDERS: GroupId = GroupId(1);
const BACKSTAGE: CategoryId = CategoryId(2);

fn engine() -> SearchEngine {
    let forum = Forum::new();
    let catalog = &forum.catalog;
    catalog.upsert_user(User::new(INSIDER, "insider"));
    catalog.upsert_user(User::new(STRANGER, "stranger"));
    catalog.upsert_user(User::admin(ROOT, "root"));
    let mut banned = User::new(BANNED, "banned");
    banned.suspended = true;
    catalog.upsert_user(banned);

    catalog.upsert_group(Group::new(INSIDERS, "insiders"));
    catalog.add_group_member(INSIDERS, INSIDER);
    catalog.upsert_category(
        Category::new(BACKSTAGE, "Backstage", "backstage")
            .with_group_permission(INSIDERS, PermissionType::Readonly),
    );

    forum.topic(1, "Public roadmap", "roadmap for everyone", 0);
    let secret = forum.topic(2, "Secret roadmap", "roadmap kept backstage", 1);
    forum.update_topic(secret.with_category(BACKSTAGE));

    let messages = [
        (3, "Roadmap chat", vec![INSIDER, STRANGER]),
        (4, "Roadmap review", vec![UserId(1), ROOT]),
    ];
    for (id, title, allowed) in messages {
        catalog.upsert_topic(
            Topic::private_message(TopicId(id), title, allowed[0], allowed)
                .with_created_at(base_time()),
        );
        forum.reply(id, 1, "roadmap message", 2);
    }
    catalog.upsert_topic(
        Topic::private_message(TopicId(5), "Insider roadmap", ROOT, vec![ROOT])
            .with_allowed_group(INSIDERS)
            .with_created_at(base_time()),
    );
    forum.reply(5, 1, "roadmap for insiders", 3);

    forum.engine(SearchConfig::default())
}

fn sorted_topics(engine: &SearchEngine, term: &str, options: &SearchOptions) -> Vec<u64> {
    let mut ids = topic_ids(&engine.execute(term, options).unwrap());
    ids.sort_unstable();
    ids
}

fn messages(identity: Identity) -> SearchOptions {
    SearchOptions::new()
        .with_identity(identity)
        .with_type_filter(TypeFilter::PrivateMessages)
        .with_skip_cache()
}

// ============================================================================
// Restricted categories
// ============================================================================

#[test]
fn test_tier3_restricted_category_for_members_and_staff() {
    let engine = engine();
    let cases = [
        (Identity::Anonymous, vec![1]),
        (Identity::User(STRANGER), vec![1]),
        (Identity::User(INSIDER), vec![1, 2]),
        (Identity::User(ROOT), vec![1, 2]),
    ];
    for (identity, expected) in cases {
        assert_eq!(
            sorted_topics(&engine, "roadmap", &topic_search(identity)),
            expected,
            "{:?}",
            identity
        );
    }
}

#[test]
fn test_tier3_hidden_category_filter_is_text() {
    let engine = engine();
    assert!(sorted_topics(&engine, "category:backstage", &topic_search(Identity::User(STRANGER)))
        .is_empty());
    assert_eq!(
        sorted_topics(&engine, "category:backstage", &topic_search(Identity::User(INSIDER))),
        vec![2]
    );
}

// ============================================================================
// Private messages
// ============================================================================

#[test]
fn test_tier3_anonymous_message_search_denied() {
    let engine = engine();
    let err = engine
        .execute("roadmap", &messages(Identity::Anonymous))
        .unwrap_err();
    assert!(matches!(err, SearchError::AccessDenied { .. }));
}

#[test]
fn test_tier3_participants_see_their_own_threads() {
    let engine = engine();
    let cases = [
        (Identity::User(INSIDER), vec![3, 5]),
        (Identity::User(STRANGER), vec![3]),
        (Identity::User(UserId(1)), vec![4]),
        (Identity::User(ROOT), vec![4, 5]),
    ];
    for (identity, expected) in cases {
        assert_eq!(
            sorted_topics(&engine, "roadmap", &messages(identity)),
            expected,
            "{:?}",
            identity
        );
    }
}

#[test]
fn test_tier3_in_personal_from_topic_search() {
    let engine = engine();
    assert_eq!(
        sorted_topics(&engine, "roadmap in:personal", &topic_search(Identity::User(INSIDER))),
        vec![3, 5]
    );
}

#[test]
fn test_tier3_other_users_messages() {
    let engine = engine();
    let err = engine
        .execute(
            "roadmap personal_messages:insider",
            &topic_search(Identity::User(STRANGER)),
        )
        .unwrap_err();
    assert!(err.is_access_denied());

    assert_eq!(
        sorted_topics(
            &engine,
            "roadmap personal_messages:insider",
            &topic_search(Identity::User(ROOT))
        ),
        vec![3]
    );
}

#[test]
fn test_tier3_group_messages_for_members() {
    let engine = engine();
    let err = engine
        .execute(
            "roadmap group_messages:insiders",
            &topic_search(Identity::User(STRANGER)),
        )
        .unwrap_err();
    assert!(err.is_access_denied());

    assert_eq!(
        sorted_topics(
            &engine,
            "roadmap group_messages:insiders",
            &topic_search(Identity::User(INSIDER))
        ),
        vec![5]
    );
}

// ============================================================================
// Direct messages
// ============================================================================

const ALICE: UserId = UserId(11);
const BOB: UserId = UserId(12);
const CAROL: UserId = UserId(13);
const CREW: GroupId = GroupId(2);

/// Threads 10..=14: alice+bob, alice+bob+carol, alice+bob with the crew
/// group, alice+carol and bob+carol
fn direct_engine() -> SearchEngine {
    let forum = Forum::new();
    let catalog = &forum.catalog;
    catalog.upsert_user(User::new(ALICE, "alice"));
    catalog.upsert_user(User::new(BOB, "bob"));
    catalog.upsert_user(User::new(CAROL, "carol"));
    catalog.upsert_group(Group::new(CREW, "crew"));
    catalog.add_group_member(CREW, ALICE);

    let threads = [
        (10, vec![ALICE, BOB], None),
        (11, vec![ALICE, BOB, CAROL], None),
        (12, vec![ALICE, BOB], Some(CREW)),
        (13, vec![ALICE, CAROL], None),
        (14, vec![BOB, CAROL], None),
    ];
    for (id, allowed, group) in threads {
        let mut topic = Topic::private_message(TopicId(id), "Lunch plans", allowed[0], allowed)
            .with_created_at(base_time());
        if let Some(group) = group {
            topic = topic.with_allowed_group(group);
        }
        catalog.upsert_topic(topic);
        forum.reply(id, 1, "lunch at noon", 0);
    }
    forum.engine(SearchConfig::default())
}

#[test]
fn test_tier3_personal_direct_is_two_users_without_groups() {
    let engine = direct_engine();
    assert_eq!(
        sorted_topics(&engine, "lunch in:personal-direct", &topic_search(Identity::User(ALICE))),
        vec![10, 13]
    );
    assert_eq!(
        sorted_topics(&engine, "lunch in:personal-direct", &topic_search(Identity::User(BOB))),
        vec![10, 14]
    );
    // Every thread alice can reach, for comparison
    assert_eq!(
        sorted_topics(&engine, "lunch in:personal", &topic_search(Identity::User(ALICE))),
        vec![10, 11, 12, 13]
    );
}

#[test]
fn test_tier3_with_user_narrows_to_shared_threads() {
    let engine = direct_engine();
    assert_eq!(
        sorted_topics(
            &engine,
            "lunch in:personal-direct with:@bob",
            &topic_search(Identity::User(ALICE))
        ),
        vec![10]
    );
    assert_eq!(
        sorted_topics(&engine, "lunch with:@bob", &messages(Identity::User(ALICE))),
        vec![10, 11, 12]
    );
    assert_eq!(
        sorted_topics(&engine, "lunch with:@carol", &messages(Identity::User(BOB))),
        vec![11, 14]
    );
}

#[test]
fn test_tier3_personal_direct_needs_login() {
    let engine = direct_engine();
    let err = engine
        .execute("lunch in:personal-direct", &topic_search(Identity::Anonymous))
        .unwrap_err();
    assert!(err.is_access_denied());
}

// ============================================================================
// Accounts
// ============================================================================

#[test]
fn test_tier3_suspended_users_only_for_staff() {
    let engine = engine();
    let users = |identity: Identity| -> Vec<EntityRef> {
        let options = SearchOptions::new()
            .with_identity(identity)
            .with_type_filter(TypeFilter::User)
            .with_skip_cache();
        engine
            .execute("banned", &options)
            .unwrap()
            .users
            .iter()
            .map(|h| h.entity_ref)
            .collect()
    };
    assert!(users(Identity::Anonymous).is_empty());
    assert!(users(Identity::User(STRANGER)).is_empty());
    assert_eq!(users(Identity::User(ROOT)), vec![EntityRef::user(BANNED)]);
}
