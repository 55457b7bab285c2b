//! Leaderboard service: bounded-staleness ranked reads.
//!
//! The service keeps one immutable [`LeaderboardSnapshot`] behind an async
//! `RwLock` and swaps it wholesale when it ages past the configured
//! staleness window. Reads never observe a half-built ranking: a page and a
//! rank lookup served between two swaps come from the same snapshot.
//! Refreshes happen on the read path and never inside the ledger's per-user
//! append scope, so appends have no blocking dependency on leaderboard
//! freshness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageEnvelope, PageRequest};
use tokio::sync::RwLock;

use crate::domain::leaderboard::{LeaderboardEntry, LeaderboardSnapshot};
use crate::domain::ports::{
    LeaderboardQuery, ProjectionRepository, ProjectionRepositoryError, RankPayload,
};
use crate::domain::{Error, UserId};

/// Default staleness window for served snapshots.
///
/// Documented to callers: ranked reads may lag the projector by up to this
/// long.
pub const DEFAULT_STALENESS: Duration = Duration::from_secs(5);

fn map_projection_error(error: ProjectionRepositoryError) -> Error {
    match error {
        ProjectionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("projection store unavailable: {message}"))
        }
        ProjectionRepositoryError::Query { message } => {
            Error::internal(format!("projection store error: {message}"))
        }
    }
}

/// Leaderboard service implementing the ranked-read driving port.
pub struct LeaderboardService<P> {
    projections: Arc<P>,
    clock: Arc<dyn Clock>,
    staleness: chrono::Duration,
    snapshot: RwLock<Arc<LeaderboardSnapshot>>,
}

impl<P> LeaderboardService<P> {
    /// Create a service refreshing snapshots older than `staleness`.
    pub fn new(projections: Arc<P>, clock: Arc<dyn Clock>, staleness: Duration) -> Self {
        let staleness = chrono::Duration::from_std(staleness)
            .unwrap_or_else(|_| chrono::Duration::MAX);
        Self {
            projections,
            clock,
            staleness,
            snapshot: RwLock::new(Arc::new(LeaderboardSnapshot::empty(
                chrono::DateTime::UNIX_EPOCH,
            ))),
        }
    }
}

impl<P> LeaderboardService<P>
where
    P: ProjectionRepository,
{
    fn is_fresh(&self, snapshot: &LeaderboardSnapshot) -> bool {
        let age = self
            .clock
            .utc()
            .signed_duration_since(snapshot.refreshed_at());
        age <= self.staleness
    }

    /// Rebuild the snapshot from the projection store immediately.
    pub async fn refresh(&self) -> Result<(), Error> {
        let projections = self
            .projections
            .list_all()
            .await
            .map_err(map_projection_error)?;
        let rebuilt = Arc::new(LeaderboardSnapshot::build(projections, self.clock.utc()));
        *self.snapshot.write().await = rebuilt;
        Ok(())
    }

    /// Current snapshot, refreshed first when it aged past the window.
    async fn current(&self) -> Result<Arc<LeaderboardSnapshot>, Error> {
        {
            let snapshot = self.snapshot.read().await;
            if self.is_fresh(&snapshot) {
                return Ok(Arc::clone(&snapshot));
            }
        }

        let mut guard = self.snapshot.write().await;
        // Another reader may have refreshed while we waited for the write
        // lock; a double-check avoids rebuilding twice under contention.
        if self.is_fresh(&guard) {
            return Ok(Arc::clone(&guard));
        }
        let projections = self
            .projections
            .list_all()
            .await
            .map_err(map_projection_error)?;
        let rebuilt = Arc::new(LeaderboardSnapshot::build(projections, self.clock.utc()));
        *guard = Arc::clone(&rebuilt);
        Ok(rebuilt)
    }
}

#[async_trait]
impl<P> LeaderboardQuery for LeaderboardService<P>
where
    P: ProjectionRepository,
{
    async fn get_page(
        &self,
        request: PageRequest,
    ) -> Result<PageEnvelope<LeaderboardEntry>, Error> {
        let snapshot = self.current().await?;
        let items = snapshot.page(request.offset(), request.limit()).to_vec();
        Ok(PageEnvelope::new(items, &request, snapshot.len() as u64))
    }

    async fn get_rank(&self, user_id: &UserId) -> Result<RankPayload, Error> {
        let snapshot = self.current().await?;
        snapshot
            .rank_of(user_id)
            .map(|rank| RankPayload { rank })
            .ok_or_else(|| Error::not_found(format!("user {user_id} has no ranked balance")))
    }
}

#[cfg(test)]
#[path = "leaderboard_service_tests.rs"]
mod tests;
