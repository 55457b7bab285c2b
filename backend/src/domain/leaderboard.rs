//! Ranked leaderboard snapshots over balance projections.
//!
//! A snapshot is immutable once built: page reads and rank lookups answer
//! from the same ordering, so a user's rank can never disagree with their
//! position in the listing for that snapshot. Freshness is the serving
//! service's concern, not this module's.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;
use super::projection::BalanceProjection;

/// One ranked row of the leaderboard.
///
/// Ranks are dense: tied balances share a rank and the next distinct balance
/// continues immediately after it, with no skipped numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// The ranked user.
    pub user_id: UserId,
    /// Projected chip balance at snapshot time.
    pub balance: i64,
    /// Dense rank, starting at 1.
    pub rank: u32,
}

/// Immutable ranked view over all balance projections.
#[derive(Debug, Clone)]
pub struct LeaderboardSnapshot {
    entries: Vec<LeaderboardEntry>,
    positions: HashMap<Uuid, usize>,
    refreshed_at: DateTime<Utc>,
}

impl LeaderboardSnapshot {
    /// Build a snapshot from projections.
    ///
    /// Ordering: balance descending; ties broken by ascending watermark so
    /// earlier accumulation lists first. The tie-break affects listing order
    /// only — tied balances still share one dense rank.
    pub fn build(mut projections: Vec<BalanceProjection>, refreshed_at: DateTime<Utc>) -> Self {
        projections.sort_by(|a, b| {
            b.balance()
                .cmp(&a.balance())
                .then_with(|| a.last_entry_seq().cmp(&b.last_entry_seq()))
        });

        let mut entries = Vec::with_capacity(projections.len());
        let mut positions = HashMap::with_capacity(projections.len());
        let mut rank = 0_u32;
        let mut previous_balance: Option<i64> = None;
        for projection in projections {
            if previous_balance != Some(projection.balance()) {
                rank = rank.saturating_add(1);
                previous_balance = Some(projection.balance());
            }
            positions.insert(*projection.user_id().as_uuid(), entries.len());
            entries.push(LeaderboardEntry {
                user_id: projection.user_id().clone(),
                balance: projection.balance(),
                rank,
            });
        }

        Self {
            entries,
            positions,
            refreshed_at,
        }
    }

    /// Empty snapshot, used before the first refresh completes.
    pub fn empty(refreshed_at: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            refreshed_at,
        }
    }

    /// Slice one page out of the snapshot.
    pub fn page(&self, offset: u64, limit: u32) -> &[LeaderboardEntry] {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= self.entries.len() {
            return &[];
        }
        let end = start.saturating_add(limit as usize).min(self.entries.len());
        self.entries.get(start..end).unwrap_or(&[])
    }

    /// Dense rank of the given user, if they appear in the snapshot.
    pub fn rank_of(&self, user_id: &UserId) -> Option<u32> {
        self.positions
            .get(user_id.as_uuid())
            .and_then(|index| self.entries.get(*index))
            .map(|entry| entry.rank)
    }

    /// Number of ranked users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot ranks no users.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When this snapshot was cut.
    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }
}
