//! PostgreSQL-backed `ReferralRepository` implementation using Diesel ORM.
//!
//! The referee primary key makes attribution first-write-wins;
//! `mark_credited` only touches rows whose `credited_at` is still null so
//! the first credit timestamp survives repeat calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{AttributionOutcome, ReferralRepository, ReferralRepositoryError};
use crate::domain::referral::ReferralEdge;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::ReferralEdgeRow;
use super::pool::{DbPool, PoolError};
use super::schema::referral_edges;

/// Diesel-backed implementation of the referral port.
#[derive(Clone)]
pub struct DieselReferralRepository {
    pool: DbPool,
}

impl DieselReferralRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ReferralRepositoryError {
    map_pool_error(error, ReferralRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ReferralRepositoryError {
    map_diesel_error(
        error,
        ReferralRepositoryError::query,
        ReferralRepositoryError::connection,
    )
}

fn row_to_edge(row: ReferralEdgeRow) -> Result<ReferralEdge, ReferralRepositoryError> {
    ReferralEdge::from_parts(
        UserId::from_uuid(row.referrer_id),
        UserId::from_uuid(row.referee_id),
        row.created_at,
        row.credited_at,
    )
    .map_err(|err| ReferralRepositoryError::corrupt(err.to_string()))
}

async fn load_by_referee(
    conn: &mut diesel_async::pooled_connection::bb8::PooledConnection<
        '_,
        diesel_async::AsyncPgConnection,
    >,
    referee_id: &UserId,
) -> Result<Option<ReferralEdge>, ReferralRepositoryError> {
    let row = referral_edges::table
        .find(referee_id.as_uuid())
        .select(ReferralEdgeRow::as_select())
        .first::<ReferralEdgeRow>(conn)
        .await
        .optional()
        .map_err(map_diesel)?;
    row.map(row_to_edge).transpose()
}

#[async_trait]
impl ReferralRepository for DieselReferralRepository {
    async fn attribute(
        &self,
        edge: ReferralEdge,
    ) -> Result<AttributionOutcome, ReferralRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = ReferralEdgeRow {
            referee_id: *edge.referee_id().as_uuid(),
            referrer_id: *edge.referrer_id().as_uuid(),
            created_at: edge.created_at(),
            credited_at: edge.credited_at(),
        };

        let inserted = diesel::insert_into(referral_edges::table)
            .values(&row)
            .on_conflict(referral_edges::referee_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if inserted > 0 {
            return Ok(AttributionOutcome::Recorded(edge));
        }

        let existing = load_by_referee(&mut conn, edge.referee_id())
            .await?
            .ok_or_else(|| {
                ReferralRepositoryError::query("attribution raced a concurrent delete")
            })?;
        Ok(AttributionOutcome::AlreadyAttributed(existing))
    }

    async fn find_by_referee(
        &self,
        referee_id: &UserId,
    ) -> Result<Option<ReferralEdge>, ReferralRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        load_by_referee(&mut conn, referee_id).await
    }

    async fn mark_credited(
        &self,
        referee_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ReferralEdge>, ReferralRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(
            referral_edges::table
                .find(referee_id.as_uuid())
                .filter(referral_edges::credited_at.is_null()),
        )
        .set(referral_edges::credited_at.eq(Some(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        load_by_referee(&mut conn, referee_id).await
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.

    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    fn row_round_trips_into_an_edge() {
        let row = ReferralEdgeRow {
            referee_id: Uuid::new_v4(),
            referrer_id: Uuid::new_v4(),
            created_at: Utc::now(),
            credited_at: Some(Utc::now()),
        };

        let edge = row_to_edge(row.clone()).expect("valid row");
        assert_eq!(edge.referee_id().as_uuid(), &row.referee_id);
        assert!(edge.is_credited());
    }

    #[rstest]
    fn self_referral_rows_surface_as_corrupt() {
        let id = Uuid::new_v4();
        let row = ReferralEdgeRow {
            referee_id: id,
            referrer_id: id,
            created_at: Utc::now(),
            credited_at: None,
        };
        let error = row_to_edge(row).expect_err("corrupt row");
        assert!(matches!(error, ReferralRepositoryError::Corrupt { .. }));
    }
}
