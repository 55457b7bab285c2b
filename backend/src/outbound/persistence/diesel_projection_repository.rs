//! PostgreSQL-backed `ProjectionRepository` implementation using Diesel ORM.
//!
//! Saves are plain upserts: the projector only writes inside the per-user
//! append scope, so the last writer is always the most recent fold.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ledger::EntrySeq;
use crate::domain::ports::{ProjectionRepository, ProjectionRepositoryError};
use crate::domain::projection::BalanceProjection;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::BalanceProjectionRow;
use super::pool::{DbPool, PoolError};
use super::schema::balance_projections;

/// Diesel-backed implementation of the projection store port.
#[derive(Clone)]
pub struct DieselProjectionRepository {
    pool: DbPool,
}

impl DieselProjectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ProjectionRepositoryError {
    map_pool_error(error, ProjectionRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ProjectionRepositoryError {
    map_diesel_error(
        error,
        ProjectionRepositoryError::query,
        ProjectionRepositoryError::connection,
    )
}

fn row_to_projection(
    row: BalanceProjectionRow,
) -> Result<BalanceProjection, ProjectionRepositoryError> {
    let BalanceProjectionRow {
        user_id,
        balance,
        referral_count,
        prompts_approved,
        last_entry_seq,
        updated_at,
    } = row;

    let referral_count = u32::try_from(referral_count).map_err(|_| {
        ProjectionRepositoryError::query(format!("negative referral count {referral_count}"))
    })?;
    let prompts_approved = u32::try_from(prompts_approved).map_err(|_| {
        ProjectionRepositoryError::query(format!("negative prompt count {prompts_approved}"))
    })?;
    let last_entry_seq = u64::try_from(last_entry_seq).map_err(|_| {
        ProjectionRepositoryError::query(format!("negative watermark {last_entry_seq}"))
    })?;

    Ok(BalanceProjection::from_parts(
        UserId::from_uuid(user_id),
        balance,
        referral_count,
        prompts_approved,
        EntrySeq::new(last_entry_seq),
        updated_at,
    ))
}

fn projection_to_row(
    projection: &BalanceProjection,
) -> Result<BalanceProjectionRow, ProjectionRepositoryError> {
    let referral_count = i32::try_from(projection.referral_count()).map_err(|_| {
        ProjectionRepositoryError::query("referral count exceeds storage range")
    })?;
    let prompts_approved = i32::try_from(projection.prompts_approved()).map_err(|_| {
        ProjectionRepositoryError::query("prompt count exceeds storage range")
    })?;
    let last_entry_seq = i64::try_from(projection.last_entry_seq().value()).map_err(|_| {
        ProjectionRepositoryError::query("watermark exceeds storage range")
    })?;

    Ok(BalanceProjectionRow {
        user_id: *projection.user_id().as_uuid(),
        balance: projection.balance(),
        referral_count,
        prompts_approved,
        last_entry_seq,
        updated_at: projection.updated_at(),
    })
}

#[async_trait]
impl ProjectionRepository for DieselProjectionRepository {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BalanceProjection>, ProjectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = balance_projections::table
            .find(user_id.as_uuid())
            .select(BalanceProjectionRow::as_select())
            .first::<BalanceProjectionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_projection).transpose()
    }

    async fn save(
        &self,
        projection: &BalanceProjection,
    ) -> Result<(), ProjectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = projection_to_row(projection)?;

        diesel::insert_into(balance_projections::table)
            .values(&row)
            .on_conflict(balance_projections::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<BalanceProjection>, ProjectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows = balance_projections::table
            .select(BalanceProjectionRow::as_select())
            .load::<BalanceProjectionRow>(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_projection).collect()
    }
}
