//! Regression coverage for ledger entities.

use chrono::Utc;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::domain::UserId;

fn source_ref(value: &str) -> SourceRef {
    SourceRef::new(value).expect("valid source ref")
}

#[rstest]
fn chip_amount_rejects_zero() {
    assert_eq!(ChipAmount::new(0), Err(LedgerValidationError::ZeroAmount));
}

#[rstest]
#[case(150, true)]
#[case(-25, false)]
fn chip_amount_classifies_sign(#[case] value: i64, #[case] credit: bool) {
    let amount = ChipAmount::new(value).expect("non-zero amount");
    assert_eq!(amount.is_credit(), credit);
    assert_eq!(amount.get(), value);
}

#[rstest]
fn source_ref_rejects_blank_and_padded_input() {
    assert!(SourceRef::new("").is_err());
    assert!(SourceRef::new("   ").is_err());
    assert!(SourceRef::new(" prompt-1 ").is_err());
}

#[rstest]
fn source_ref_rejects_oversized_input() {
    let oversized = "x".repeat(200);
    assert!(matches!(
        SourceRef::new(oversized),
        Err(LedgerValidationError::SourceRefTooLong { .. })
    ));
}

#[rstest]
fn new_entry_requires_source_ref_for_keyed_reasons() {
    let amount = ChipAmount::new(100).expect("non-zero amount");
    let error = NewLedgerEntry::new(
        UserId::random(),
        amount,
        ChipReason::PromptApproved,
        None,
        UserId::random(),
    )
    .expect_err("missing source ref");
    assert!(matches!(
        error,
        LedgerValidationError::MissingSourceRef {
            reason: ChipReason::PromptApproved
        }
    ));
}

#[rstest]
fn admin_adjustment_permits_missing_source_ref() {
    let amount = ChipAmount::new(-50).expect("non-zero amount");
    let entry = NewLedgerEntry::new(
        UserId::random(),
        amount,
        ChipReason::AdminAdjustment,
        None,
        UserId::random(),
    );
    assert!(entry.is_ok());
}

#[rstest]
fn reason_parses_all_wire_names() {
    for reason in [
        ChipReason::ProfileCompletion,
        ChipReason::PromptApproved,
        ChipReason::ReferralCredit,
        ChipReason::BadgeReward,
        ChipReason::AdminAdjustment,
        ChipReason::EventReward,
    ] {
        let parsed: ChipReason = reason.to_string().parse().expect("round trip");
        assert_eq!(parsed, reason);
    }
}

#[rstest]
fn record_try_from_revalidates_invariants() {
    let record = LedgerEntryRecord {
        entry_id: Uuid::new_v4(),
        seq: EntrySeq::new(7),
        user_id: UserId::random(),
        amount: 0,
        reason: ChipReason::EventReward,
        source_ref: Some("event-3".to_owned()),
        created_at: Utc::now(),
        created_by: UserId::random(),
    };
    assert!(matches!(
        LedgerEntry::try_from(record),
        Err(LedgerValidationError::ZeroAmount)
    ));
}

#[rstest]
fn sealed_entry_preserves_request_fields() {
    let user = UserId::random();
    let actor = UserId::random();
    let amount = ChipAmount::new(200).expect("non-zero amount");
    let request = NewLedgerEntry::new(
        user.clone(),
        amount,
        ChipReason::PromptApproved,
        Some(source_ref("prompt-42")),
        actor.clone(),
    )
    .expect("valid request");

    let entry = LedgerEntry::record(request, Uuid::new_v4(), EntrySeq::new(1), Utc::now());

    assert_eq!(entry.user_id(), &user);
    assert_eq!(entry.created_by(), &actor);
    assert_eq!(entry.amount().get(), 200);
    assert_eq!(entry.seq(), EntrySeq::new(1));
    assert_eq!(
        entry.source_ref().map(SourceRef::as_str),
        Some("prompt-42")
    );
}

#[rstest]
fn entry_seq_orders_naturally() {
    assert!(EntrySeq::ORIGIN < EntrySeq::new(1));
    assert!(EntrySeq::new(1) < EntrySeq::new(2));
}
