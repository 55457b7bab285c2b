//! Enumerated reasons a ledger entry can exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why chips were credited or debited.
///
/// Every reason except [`ChipReason::AdminAdjustment`] must carry a source
/// reference identifying the triggering object, which is what makes retries
/// idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipReason {
    /// The user completed their profile.
    ProfileCompletion,
    /// An admin approved one of the user's prompt submissions.
    PromptApproved,
    /// A referred user completed the qualifying action.
    ReferralCredit,
    /// A badge unlock paid out its chip reward.
    BadgeReward,
    /// Manual correction or grant by an administrator.
    AdminAdjustment,
    /// Participation reward for a platform event.
    EventReward,
}

impl ChipReason {
    /// Whether entries with this reason must carry a source reference.
    ///
    /// Admin adjustments are the only reason without a triggering object;
    /// everything else is keyed by one for idempotency.
    pub fn requires_source_ref(self) -> bool {
        !matches!(self, Self::AdminAdjustment)
    }
}

/// Error returned when parsing a [`ChipReason`] from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseChipReasonError;

impl fmt::Display for ChipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileCompletion => f.write_str("profile_completion"),
            Self::PromptApproved => f.write_str("prompt_approved"),
            Self::ReferralCredit => f.write_str("referral_credit"),
            Self::BadgeReward => f.write_str("badge_reward"),
            Self::AdminAdjustment => f.write_str("admin_adjustment"),
            Self::EventReward => f.write_str("event_reward"),
        }
    }
}

impl fmt::Display for ParseChipReasonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid chip reason")
    }
}

impl std::error::Error for ParseChipReasonError {}

impl FromStr for ChipReason {
    type Err = ParseChipReasonError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "profile_completion" => Ok(Self::ProfileCompletion),
            "prompt_approved" => Ok(Self::PromptApproved),
            "referral_credit" => Ok(Self::ReferralCredit),
            "badge_reward" => Ok(Self::BadgeReward),
            "admin_adjustment" => Ok(Self::AdminAdjustment),
            "event_reward" => Ok(Self::EventReward),
            _ => Err(ParseChipReasonError),
        }
    }
}
