//! Tests for the badge rule engine.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::domain::UserId;
use crate::domain::badge::{BadgeDefinitionDraft, UnlockRule};
use crate::domain::ledger::EntrySeq;
use crate::domain::ports::{MockBadgeCatalogRepository, MockUserBadgeRepository};

fn badge(name: &str, rule: UnlockRule, chips_reward: u32) -> BadgeDefinition {
    BadgeDefinition::new(BadgeDefinitionDraft {
        badge_id: Uuid::new_v4(),
        name: name.to_owned(),
        description: format!("{name} description"),
        icon: "medal".to_owned(),
        chips_reward,
        unlock_rule: rule,
    })
    .expect("valid badge")
}

fn projection(user: &UserId, balance: i64, referrals: u32) -> BalanceProjection {
    BalanceProjection::from_parts(
        user.clone(),
        balance,
        referrals,
        0,
        EntrySeq::new(1),
        Utc::now(),
    )
}

#[rstest]
#[tokio::test]
async fn returns_only_unmet_badges_not_already_earned() {
    let user = UserId::random();
    let earned = badge("Early Bird", UnlockRule::BalanceAtLeast { threshold: 10 }, 0);
    let unlockable = badge("Profile Master", UnlockRule::BalanceAtLeast { threshold: 100 }, 50);
    let out_of_reach = badge("Whale", UnlockRule::BalanceAtLeast { threshold: 10_000 }, 500);
    let earned_id = earned.badge_id();
    let unlockable_id = unlockable.badge_id();

    let mut catalog = MockBadgeCatalogRepository::new();
    catalog
        .expect_list()
        .times(1)
        .return_once(move || Ok(vec![earned, unlockable, out_of_reach]));
    let mut user_badges = MockUserBadgeRepository::new();
    user_badges
        .expect_earned_badge_ids()
        .times(1)
        .return_once(move |_| Ok(vec![earned_id]));

    let engine = BadgeRuleEngine::new(Arc::new(catalog), Arc::new(user_badges));
    let newly = engine
        .newly_unlockable(&projection(&user, 150, 0))
        .await
        .expect("evaluation succeeds");

    assert_eq!(newly.len(), 1);
    assert_eq!(
        newly.first().map(BadgeDefinition::badge_id),
        Some(unlockable_id)
    );
}

#[rstest]
#[tokio::test]
async fn referral_rules_read_the_referral_counter() {
    let user = UserId::random();
    let referral_badge = badge(
        "Connector",
        UnlockRule::ReferralCountAtLeast { threshold: 6 },
        25,
    );

    let mut catalog = MockBadgeCatalogRepository::new();
    catalog
        .expect_list()
        .times(2)
        .returning(move || Ok(vec![referral_badge.clone()]));
    let mut user_badges = MockUserBadgeRepository::new();
    user_badges
        .expect_earned_badge_ids()
        .times(2)
        .returning(|_| Ok(Vec::new()));

    let engine = BadgeRuleEngine::new(Arc::new(catalog), Arc::new(user_badges));

    let below = engine
        .newly_unlockable(&projection(&user, 0, 5))
        .await
        .expect("evaluation succeeds");
    assert!(below.is_empty());

    let at_threshold = engine
        .newly_unlockable(&projection(&user, 0, 6))
        .await
        .expect("evaluation succeeds");
    assert_eq!(at_threshold.len(), 1);
}

#[rstest]
#[tokio::test]
async fn record_earned_reports_duplicate_insertions() {
    let mut user_badges = MockUserBadgeRepository::new();
    user_badges
        .expect_record_if_absent()
        .times(2)
        .returning({
            let mut first = true;
            move |_| {
                let inserted = first;
                first = false;
                Ok(inserted)
            }
        });

    let engine = BadgeRuleEngine::new(
        Arc::new(MockBadgeCatalogRepository::new()),
        Arc::new(user_badges),
    );
    let fact = UserBadge {
        user_id: UserId::random(),
        badge_id: Uuid::new_v4(),
        earned_at: Utc::now(),
    };

    assert!(engine.record_earned(&fact).await.expect("first insert"));
    assert!(!engine.record_earned(&fact).await.expect("second insert"));
}

#[rstest]
#[tokio::test]
async fn catalog_connection_failure_maps_to_service_unavailable() {
    let mut catalog = MockBadgeCatalogRepository::new();
    catalog.expect_list().times(1).return_once(|| {
        Err(BadgeCatalogRepositoryError::connection("pool unavailable"))
    });
    let mut user_badges = MockUserBadgeRepository::new();
    user_badges.expect_earned_badge_ids().times(0);

    let engine = BadgeRuleEngine::new(Arc::new(catalog), Arc::new(user_badges));
    let error = engine
        .newly_unlockable(&projection(&UserId::random(), 100, 0))
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), crate::domain::ErrorCode::ServiceUnavailable);
}
