//! Driving port for recording chip events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ledger::ChipReason;
use crate::domain::projection::Tier;
use crate::domain::{Actor, Error, UserId};

/// Request to record one chip-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordChipEventRequest {
    /// Authenticated actor submitting the event.
    pub actor: Actor,
    /// User whose balance the event affects.
    pub user_id: UserId,
    /// Signed chip delta; positive credits, negative debits, zero rejected.
    pub amount: i64,
    /// Why the event happened.
    pub reason: ChipReason,
    /// Identifier of the triggering object; required for every reason except
    /// `admin_adjustment`.
    pub source_ref: Option<String>,
}

/// A badge unlocked as a consequence of one recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedBadgePayload {
    /// Stable badge identifier.
    pub badge_id: Uuid,
    /// Display name at unlock time.
    pub name: String,
    /// Chips credited by the unlock.
    pub chips_reward: u32,
}

/// Response from recording a chip event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordChipEventResponse {
    /// Identifier of the recorded (or pre-existing) ledger entry.
    pub entry_id: Uuid,
    /// Balance after the event and any badge rewards it triggered.
    pub balance: i64,
    /// Referral tier after the event.
    pub tier: Tier,
    /// Whether an earlier identical trigger absorbed this request.
    pub duplicate: bool,
    /// Badges unlocked by this request, in unlock order. Empty on duplicate
    /// requests: the original request already reported them.
    pub newly_unlocked_badges: Vec<UnlockedBadgePayload>,
}

/// Driving port for chip event writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChipLedgerCommand: Send + Sync {
    /// Record a chip event, fold it into the user's projection, and award
    /// any badges it unlocks.
    ///
    /// Idempotent on `(user, reason, source ref)`: retrying a timed-out
    /// request returns the original entry with `duplicate: true` and no
    /// second balance change.
    async fn record_chip_event(
        &self,
        request: RecordChipEventRequest,
    ) -> Result<RecordChipEventResponse, Error>;
}
