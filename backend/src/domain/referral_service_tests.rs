//! Tests for the referral service.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    AttributionOutcome, MockChipLedgerCommand, MockReferralRepository, RecordChipEventResponse,
};
use crate::domain::{Actor, ErrorCode, Tier, UserId};

fn service(
    referrals: MockReferralRepository,
    ledger: MockChipLedgerCommand,
) -> ReferralService<MockReferralRepository, MockChipLedgerCommand> {
    ReferralService::new(Arc::new(referrals), Arc::new(ledger), Arc::new(DefaultClock))
}

fn recorded_response(duplicate: bool) -> RecordChipEventResponse {
    RecordChipEventResponse {
        entry_id: Uuid::new_v4(),
        balance: REFERRAL_CREDIT_CHIPS,
        tier: Tier::Bronze,
        duplicate,
        newly_unlocked_badges: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn attribute_rejects_self_referral() {
    let svc = service(MockReferralRepository::new(), MockChipLedgerCommand::new());
    let user = UserId::random();

    let error = svc
        .attribute(AttributeReferralRequest {
            actor: Actor::member(user.clone()),
            referee_id: user,
        })
        .await
        .expect_err("self referral");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn attribute_reports_first_attribution_wins() {
    let original_referrer = UserId::random();
    let referee = UserId::random();
    let existing = ReferralEdge::new(original_referrer.clone(), referee.clone(), Utc::now())
        .expect("valid edge");

    let mut referrals = MockReferralRepository::new();
    referrals
        .expect_attribute()
        .times(1)
        .return_once(move |_| Ok(AttributionOutcome::AlreadyAttributed(existing)));

    let svc = service(referrals, MockChipLedgerCommand::new());
    let response = svc
        .attribute(AttributeReferralRequest {
            actor: Actor::member(UserId::random()),
            referee_id: referee.clone(),
        })
        .await
        .expect("attribution resolves");

    assert!(response.already_attributed);
    assert_eq!(response.referrer_id, original_referrer);
    assert_eq!(response.referee_id, referee);
}

#[rstest]
#[tokio::test]
async fn complete_requires_admin_role() {
    let svc = service(MockReferralRepository::new(), MockChipLedgerCommand::new());

    let error = svc
        .complete(CompleteReferralRequest {
            actor: Actor::member(UserId::random()),
            referee_id: UserId::random(),
        })
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn complete_credits_the_referrer_through_the_ledger() {
    let referrer = UserId::random();
    let referee = UserId::random();
    let mut edge = ReferralEdge::new(referrer.clone(), referee.clone(), Utc::now())
        .expect("valid edge");
    assert!(edge.mark_credited(Utc::now()));

    let mut referrals = MockReferralRepository::new();
    referrals
        .expect_mark_credited()
        .times(1)
        .return_once(move |_, _| Ok(Some(edge)));

    let expected_referrer = referrer.clone();
    let expected_source = referee.to_string();
    let mut ledger = MockChipLedgerCommand::new();
    ledger
        .expect_record_chip_event()
        .times(1)
        .withf(move |request| {
            request.user_id == expected_referrer
                && request.reason == crate::domain::ChipReason::ReferralCredit
                && request.amount == REFERRAL_CREDIT_CHIPS
                && request.source_ref.as_deref() == Some(expected_source.as_str())
        })
        .return_once(|_| Ok(recorded_response(false)));

    let svc = service(referrals, ledger);
    let response = svc
        .complete(CompleteReferralRequest {
            actor: Actor::admin(UserId::random()),
            referee_id: referee,
        })
        .await
        .expect("completion succeeds");

    assert!(response.credited);
    assert_eq!(response.referrer_id, referrer);
}

#[rstest]
#[tokio::test]
async fn repeat_completion_converges_without_double_credit() {
    let referrer = UserId::random();
    let referee = UserId::random();
    let mut edge = ReferralEdge::new(referrer, referee.clone(), Utc::now()).expect("valid edge");
    assert!(edge.mark_credited(Utc::now()));

    let mut referrals = MockReferralRepository::new();
    referrals
        .expect_mark_credited()
        .times(1)
        .return_once(move |_, _| Ok(Some(edge)));

    let mut ledger = MockChipLedgerCommand::new();
    ledger
        .expect_record_chip_event()
        .times(1)
        .return_once(|_| Ok(recorded_response(true)));

    let svc = service(referrals, ledger);
    let response = svc
        .complete(CompleteReferralRequest {
            actor: Actor::admin(UserId::random()),
            referee_id: referee,
        })
        .await
        .expect("completion succeeds");

    assert!(!response.credited);
}

#[rstest]
#[tokio::test]
async fn complete_without_attribution_reads_not_found() {
    let mut referrals = MockReferralRepository::new();
    referrals
        .expect_mark_credited()
        .times(1)
        .return_once(|_, _| Ok(None));

    let svc = service(referrals, MockChipLedgerCommand::new());
    let error = svc
        .complete(CompleteReferralRequest {
            actor: Actor::admin(UserId::random()),
            referee_id: UserId::random(),
        })
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
