//! Driving port for leaderboard reads.

use async_trait::async_trait;
use pagination::{PageEnvelope, PageRequest};
use serde::{Deserialize, Serialize};

use crate::domain::leaderboard::LeaderboardEntry;
use crate::domain::{Error, UserId};

/// A user's dense rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankPayload {
    /// Dense rank, starting at 1.
    pub rank: u32,
}

/// Driving port for ranked reads over projected balances.
///
/// Reads are served from a bounded-staleness snapshot; a page and a rank
/// lookup answered by the same snapshot always agree.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardQuery: Send + Sync {
    /// One page of the leaderboard, balance descending.
    async fn get_page(
        &self,
        request: PageRequest,
    ) -> Result<PageEnvelope<LeaderboardEntry>, Error>;

    /// Dense rank for a user; `NotFound` when the user has no projection.
    async fn get_rank(&self, user_id: &UserId) -> Result<RankPayload, Error>;
}
