//! Driving port for balance reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::projection::Tier;
use crate::domain::{Error, UserId};

/// A user's projected balance and tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePayload {
    /// Projected chip balance.
    pub balance: i64,
    /// Referral tier.
    pub tier: Tier,
}

/// Driving port for reading a user's balance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceQuery: Send + Sync {
    /// Current balance and tier for a user.
    ///
    /// A user known to the directory but without any ledger entries reads as
    /// zero balance in the entry tier.
    async fn get_balance(&self, user_id: &UserId) -> Result<BalancePayload, Error>;
}
