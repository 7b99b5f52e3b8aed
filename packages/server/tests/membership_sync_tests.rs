//! Integration tests for membership toggles through the catalog.
//!
//! Covers the counter/id-list protocol end to end against the in-memory store:
//! - join/leave round trips
//! - idempotent joins and no-op leaves
//! - capacity limits, including concurrent joins
//! - failures leaving local state untouched
//! - replies and refreshes that finish out of order

mod common;

use common::{TestHarness, GROUP_OWNER};
use mindsync_core::common::Email;
use mindsync_core::domains::membership::{MembershipChange, MembershipError, MembershipKind};
use std::time::Duration;
use test_context::test_context;

fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn join_then_leave_restores_counter(ctx: &TestHarness) {
    let id = ctx.seed.event_id;
    let user = email("u@x.com");
    let before = ctx.catalog.event(id).await.unwrap().attendees;

    assert!(
        ctx.catalog
            .toggle_membership(MembershipKind::Event, id.into_uuid(), &user, true)
            .await
    );
    let joined = ctx.catalog.event(id).await.unwrap();
    assert_eq!(joined.attendees, before + 1);
    assert_eq!(
        joined.attendee_ids.iter().filter(|i| *i == "u@x.com").count(),
        1
    );

    assert!(
        ctx.catalog
            .toggle_membership(MembershipKind::Event, id.into_uuid(), &user, false)
            .await
    );
    let left = ctx.catalog.event(id).await.unwrap();
    assert_eq!(left.attendees, before);
    assert!(!left.attendee_ids.contains(&"u@x.com".to_string()));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn joining_twice_never_duplicates(ctx: &TestHarness) {
    let id = ctx.seed.job_id.into_uuid();
    let user = email("u@x.com");

    let first = ctx
        .catalog
        .try_toggle_membership(MembershipKind::Job, id, &user, true)
        .await
        .unwrap();
    let second = ctx
        .catalog
        .try_toggle_membership(MembershipKind::Job, id, &user, true)
        .await
        .unwrap();

    assert_eq!(first, MembershipChange::Joined);
    assert_eq!(second, MembershipChange::AlreadyMember);
    let job = ctx.catalog.job(ctx.seed.job_id).await.unwrap();
    assert_eq!(job.applicants, 1);
    assert_eq!(job.applicant_ids, vec!["u@x.com".to_string()]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn leaving_without_membership_changes_nothing(ctx: &TestHarness) {
    let id = ctx.seed.group_id;
    let before = ctx.catalog.group(id).await.unwrap();

    let change = ctx
        .catalog
        .try_toggle_membership(MembershipKind::Group, id.into_uuid(), &email("z@x.com"), false)
        .await
        .unwrap();

    assert_eq!(change, MembershipChange::NotMember);
    assert_eq!(ctx.catalog.group(id).await.unwrap(), before);
    assert_eq!(ctx.deps.store.group(id).unwrap(), before);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn local_copy_matches_store_after_a_sequence(ctx: &TestHarness) {
    let id = ctx.seed.group_id;
    let steps = [("a@x.com", true), ("b@x.com", true), ("a@x.com", false), (GROUP_OWNER, false)];

    for (user, join) in steps {
        assert!(
            ctx.catalog
                .toggle_membership(MembershipKind::Group, id.into_uuid(), &email(user), join)
                .await
        );
    }

    let local = ctx.catalog.group(id).await.unwrap();
    let remote = ctx.deps.store.group(id).unwrap();
    assert_eq!(local.members, remote.members);
    assert_eq!(local.member_ids, remote.member_ids);
    assert_eq!(local.member_ids, vec!["b@x.com".to_string()]);
    assert_eq!(local.members, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn store_failure_reports_false_and_keeps_state(ctx: &TestHarness) {
    let id = ctx.seed.event_id;
    let before = ctx.catalog.event(id).await.unwrap();
    ctx.deps.store.set_offline(true);

    let ok = ctx
        .catalog
        .toggle_membership(MembershipKind::Event, id.into_uuid(), &email("u@x.com"), true)
        .await;

    assert!(!ok);
    assert_eq!(ctx.catalog.event(id).await.unwrap(), before);
    assert_eq!(ctx.deps.store.membership_calls().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_entity_is_not_found(ctx: &TestHarness) {
    let missing = uuid::Uuid::now_v7();

    let err = ctx
        .catalog
        .try_toggle_membership(MembershipKind::Event, missing, &email("u@x.com"), true)
        .await
        .unwrap_err();

    assert!(matches!(err, MembershipError::NotFound { entity_id, .. } if entity_id == missing));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn full_event_rejects_further_joins(ctx: &TestHarness) {
    let id = ctx.seed.event_id.into_uuid();
    for user in ["a@x.com", "b@x.com"] {
        ctx.catalog
            .try_toggle_membership(MembershipKind::Event, id, &email(user), true)
            .await
            .unwrap();
    }

    let err = ctx
        .catalog
        .try_toggle_membership(MembershipKind::Event, id, &email("c@x.com"), true)
        .await
        .unwrap_err();

    assert!(matches!(err, MembershipError::CapacityReached { capacity: 2, .. }));
    let event = ctx.catalog.event(ctx.seed.event_id).await.unwrap();
    assert_eq!(event.attendees, 2);
    assert!(!event.attendee_ids.contains(&"c@x.com".to_string()));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_joins_respect_capacity(ctx: &TestHarness) {
    // Group seeded with its owner and room for two more
    let id = ctx.seed.group_id;
    let users: Vec<Email> = (0..6).map(|i| email(&format!("s{}@x.com", i))).collect();

    let results = futures::future::join_all(users.iter().map(|user| {
        ctx.catalog
            .toggle_membership(MembershipKind::Group, id.into_uuid(), user, true)
    }))
    .await;

    assert_eq!(results.iter().filter(|ok| **ok).count(), 2);
    let group = ctx.catalog.group(id).await.unwrap();
    assert_eq!(group.members, 3);
    assert_eq!(group.member_ids.len(), 3);
    assert_eq!(ctx.deps.store.group(id).unwrap(), group);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn replies_arriving_in_reverse_order_keep_every_join(ctx: &TestHarness) {
    let id = ctx.seed.group_id;
    let users: Vec<Email> = (0..6).map(|i| email(&format!("s{}@x.com", i))).collect();
    // First writer answers last
    for (i, user) in users.iter().enumerate() {
        let delay = Duration::from_millis(40 * (users.len() - i) as u64);
        ctx.deps.store.delay_membership_for(user.as_str(), delay);
    }

    let results = futures::future::join_all(users.iter().map(|user| {
        ctx.catalog
            .toggle_membership(MembershipKind::Group, id.into_uuid(), user, true)
    }))
    .await;

    assert_eq!(results, vec![true, true, false, false, false, false]);
    let group = ctx.catalog.group(id).await.unwrap();
    assert_eq!(group.member_ids, vec![GROUP_OWNER, "s0@x.com", "s1@x.com"]);
    assert_eq!(group.members, 3);
    assert_eq!(ctx.deps.store.group(id).unwrap(), group);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn refresh_overlapping_a_toggle_keeps_it(ctx: &TestHarness) {
    let id = ctx.seed.job_id;
    ctx.deps.store.set_list_delay(Duration::from_millis(200));

    let (refreshed, joined) = tokio::join!(ctx.catalog.refresh(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.catalog
            .toggle_membership(MembershipKind::Job, id.into_uuid(), &email("u@x.com"), true)
            .await
    });

    assert!(refreshed.is_ok());
    assert!(joined);
    let job = ctx.catalog.job(id).await.unwrap();
    assert!(job.applicant_ids.contains(&"u@x.com".to_string()));
    assert_eq!(ctx.deps.store.job(id).unwrap(), job);
}
