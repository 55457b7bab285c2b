//! Driving port for referral attribution and crediting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, Error, UserId};

/// Request to attribute a referee to the acting referrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeReferralRequest {
    /// Authenticated actor claiming the referral; becomes the referrer.
    pub actor: Actor,
    /// The referred user.
    pub referee_id: UserId,
}

/// Response from an attribution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeReferralResponse {
    /// The winning referrer for the referee.
    pub referrer_id: UserId,
    /// The referred user.
    pub referee_id: UserId,
    /// Whether an earlier attribution already claimed the referee.
    pub already_attributed: bool,
}

/// Request to credit a referral after the qualifying action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteReferralRequest {
    /// Authenticated actor; must be an admin.
    pub actor: Actor,
    /// The referee who completed the qualifying action.
    pub referee_id: UserId,
}

/// Response from crediting a referral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReferralResponse {
    /// The referrer who received (or already held) the credit.
    pub referrer_id: UserId,
    /// Whether this call performed the credit; `false` when the referral was
    /// already credited.
    pub credited: bool,
}

/// Driving port for referral operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralCommand: Send + Sync {
    /// Record an attribution; first attribution wins and repeat attempts are
    /// reported, not failed.
    async fn attribute(
        &self,
        request: AttributeReferralRequest,
    ) -> Result<AttributeReferralResponse, Error>;

    /// Credit the referee's referrer once the qualifying action completed.
    /// Idempotent: the chip credit is keyed by the referee id.
    async fn complete(
        &self,
        request: CompleteReferralRequest,
    ) -> Result<CompleteReferralResponse, Error>;
}
