//! Balance projection: the derived per-user summary of the ledger.
//!
//! The projection is a pure fold over a user's ledger entries. It carries a
//! watermark of the last sequence folded in, so re-applying an entry is a
//! no-op and an incremental projection can always be checked against a full
//! rebuild. Rebuild/incremental equivalence is the core correctness property
//! of the subsystem and is exercised directly by the tests below.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::ledger::{ChipReason, EntrySeq, LedgerEntry};

/// Referral-count tier classification.
///
/// Bounds are closed, non-overlapping, and gap-free: Bronze 0–5, Silver
/// 6–15, Gold 16–50, Platinum 51 and up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 0–5 credited referrals.
    Bronze,
    /// 6–15 credited referrals.
    Silver,
    /// 16–50 credited referrals.
    Gold,
    /// 51+ credited referrals.
    Platinum,
}

impl Tier {
    /// Derive the tier for a credited referral count.
    pub fn from_referral_count(count: u32) -> Self {
        match count {
            0..=5 => Self::Bronze,
            6..=15 => Self::Silver,
            16..=50 => Self::Gold,
            _ => Self::Platinum,
        }
    }
}

/// Error returned when parsing a [`Tier`] from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTierError;

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bronze => f.write_str("bronze"),
            Self::Silver => f.write_str("silver"),
            Self::Gold => f.write_str("gold"),
            Self::Platinum => f.write_str("platinum"),
        }
    }
}

impl fmt::Display for ParseTierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid tier")
    }
}

impl std::error::Error for ParseTierError {}

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(ParseTierError),
        }
    }
}

/// Derived, per-user summary of the ledger.
///
/// Owned exclusively by the projector; inbound and admin code read it but
/// never write it. Created on the first entry for a user and never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceProjection {
    user_id: UserId,
    balance: i64,
    referral_count: u32,
    prompts_approved: u32,
    last_entry_seq: EntrySeq,
    updated_at: DateTime<Utc>,
}

impl BalanceProjection {
    /// Empty projection for a user with no folded entries.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: 0,
            referral_count: 0,
            prompts_approved: 0,
            last_entry_seq: EntrySeq::ORIGIN,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Reconstruct a projection from stored fields.
    ///
    /// Used by persistence adapters when loading the projector's own state;
    /// no validation applies because the projector is the only writer.
    pub fn from_parts(
        user_id: UserId,
        balance: i64,
        referral_count: u32,
        prompts_approved: u32,
        last_entry_seq: EntrySeq,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            balance,
            referral_count,
            prompts_approved,
            last_entry_seq,
            updated_at,
        }
    }

    /// Fold one ledger entry into the projection.
    ///
    /// Returns `false` and changes nothing when the entry sits at or below
    /// the watermark, which makes re-application safe. Entries for a
    /// different user are rejected the same way; the caller routed them
    /// incorrectly.
    pub fn fold(&mut self, entry: &LedgerEntry) -> bool {
        if entry.user_id() != &self.user_id {
            return false;
        }
        if entry.seq() <= self.last_entry_seq {
            return false;
        }

        let delta = entry.amount().get();
        self.balance = self.balance.saturating_add(delta);
        match entry.reason() {
            ChipReason::ReferralCredit => {
                self.referral_count = if entry.amount().is_credit() {
                    self.referral_count.saturating_add(1)
                } else {
                    // Reversal entries undo one referral credit.
                    self.referral_count.saturating_sub(1)
                };
            }
            ChipReason::PromptApproved => {
                self.prompts_approved = if entry.amount().is_credit() {
                    self.prompts_approved.saturating_add(1)
                } else {
                    self.prompts_approved.saturating_sub(1)
                };
            }
            ChipReason::ProfileCompletion
            | ChipReason::BadgeReward
            | ChipReason::AdminAdjustment
            | ChipReason::EventReward => {}
        }
        self.last_entry_seq = entry.seq();
        self.updated_at = entry.created_at();
        true
    }

    /// Replay a full entry sequence into a fresh projection.
    ///
    /// The result must equal what incremental [`BalanceProjection::fold`]
    /// calls produce for the same entries; recovery and drift detection rely
    /// on that equivalence.
    pub fn rebuild<'a>(user_id: UserId, entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let mut projection = Self::new(user_id);
        for entry in entries {
            projection.fold(entry);
        }
        projection
    }

    /// The projected user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Current chip balance: the sum of all folded amounts.
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Number of credited referrals folded in.
    pub fn referral_count(&self) -> u32 {
        self.referral_count
    }

    /// Number of approved prompts folded in.
    pub fn prompts_approved(&self) -> u32 {
        self.prompts_approved
    }

    /// Watermark of the last folded entry.
    pub fn last_entry_seq(&self) -> EntrySeq {
        self.last_entry_seq
    }

    /// When the last folded entry was recorded.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Referral tier derived from the current referral count.
    ///
    /// Derived on read rather than stored, so it can never go stale against
    /// the count it is defined by.
    pub fn tier(&self) -> Tier {
        Tier::from_referral_count(self.referral_count)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ledger::{ChipAmount, NewLedgerEntry, SourceRef};

    fn entry(user: &UserId, seq: u64, amount: i64, reason: ChipReason) -> LedgerEntry {
        let source_ref = reason
            .requires_source_ref()
            .then(|| SourceRef::new(format!("src-{seq}")).expect("valid source ref"));
        let request = NewLedgerEntry::new(
            user.clone(),
            ChipAmount::new(amount).expect("non-zero amount"),
            reason,
            source_ref,
            user.clone(),
        )
        .expect("valid request");
        LedgerEntry::record(request, Uuid::new_v4(), EntrySeq::new(seq), Utc::now())
    }

    #[rstest]
    #[case(0, Tier::Bronze)]
    #[case(5, Tier::Bronze)]
    #[case(6, Tier::Silver)]
    #[case(15, Tier::Silver)]
    #[case(16, Tier::Gold)]
    #[case(50, Tier::Gold)]
    #[case(51, Tier::Platinum)]
    #[case(u32::MAX, Tier::Platinum)]
    fn tier_bounds_are_closed_and_gap_free(#[case] count: u32, #[case] expected: Tier) {
        assert_eq!(Tier::from_referral_count(count), expected);
    }

    #[rstest]
    fn tier_is_monotonic_in_referral_count() {
        let mut previous = Tier::from_referral_count(0);
        for count in 1..200 {
            let current = Tier::from_referral_count(count);
            assert!(current >= previous, "tier regressed at count {count}");
            previous = current;
        }
    }

    #[rstest]
    fn fold_accumulates_balance_and_counters() {
        let user = UserId::random();
        let mut projection = BalanceProjection::new(user.clone());

        assert!(projection.fold(&entry(&user, 1, 100, ChipReason::ProfileCompletion)));
        assert!(projection.fold(&entry(&user, 2, 200, ChipReason::PromptApproved)));
        assert!(projection.fold(&entry(&user, 3, 100, ChipReason::ReferralCredit)));

        assert_eq!(projection.balance(), 400);
        assert_eq!(projection.prompts_approved(), 1);
        assert_eq!(projection.referral_count(), 1);
        assert_eq!(projection.last_entry_seq(), EntrySeq::new(3));
    }

    #[rstest]
    fn fold_ignores_entries_at_or_below_watermark() {
        let user = UserId::random();
        let mut projection = BalanceProjection::new(user.clone());
        let first = entry(&user, 1, 100, ChipReason::ProfileCompletion);

        assert!(projection.fold(&first));
        assert!(!projection.fold(&first));
        assert_eq!(projection.balance(), 100);
    }

    #[rstest]
    fn fold_rejects_entries_for_other_users() {
        let user = UserId::random();
        let other = UserId::random();
        let mut projection = BalanceProjection::new(user);

        assert!(!projection.fold(&entry(&other, 1, 100, ChipReason::ProfileCompletion)));
        assert_eq!(projection.balance(), 0);
    }

    #[rstest]
    fn referral_reversal_decrements_count() {
        let user = UserId::random();
        let mut projection = BalanceProjection::new(user.clone());

        assert!(projection.fold(&entry(&user, 1, 100, ChipReason::ReferralCredit)));
        assert!(projection.fold(&entry(&user, 2, -100, ChipReason::ReferralCredit)));

        assert_eq!(projection.referral_count(), 0);
        assert_eq!(projection.balance(), 0);
    }

    #[rstest]
    fn rebuild_matches_incremental_fold() {
        let user = UserId::random();
        let entries = vec![
            entry(&user, 1, 100, ChipReason::ProfileCompletion),
            entry(&user, 2, 200, ChipReason::PromptApproved),
            entry(&user, 3, -50, ChipReason::AdminAdjustment),
            entry(&user, 4, 100, ChipReason::ReferralCredit),
            entry(&user, 5, 50, ChipReason::BadgeReward),
        ];

        let mut incremental = BalanceProjection::new(user.clone());
        for item in &entries {
            incremental.fold(item);
        }
        let rebuilt = BalanceProjection::rebuild(user, &entries);

        assert_eq!(rebuilt, incremental);
        assert_eq!(rebuilt.balance(), 400);
    }
}
