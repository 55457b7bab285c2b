//! PostgreSQL-backed `UserBadgeRepository` implementation using Diesel ORM.
//!
//! `(user, badge)` uniqueness is the composite primary key;
//! `record_if_absent` maps `ON CONFLICT DO NOTHING` row counts onto the
//! port's inserted/already-held boolean.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::badge::UserBadge;
use crate::domain::ports::{UserBadgeRepository, UserBadgeRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserBadgeRow;
use super::pool::{DbPool, PoolError};
use super::schema::user_badges;

/// Diesel-backed implementation of the earned-badge port.
#[derive(Clone)]
pub struct DieselUserBadgeRepository {
    pool: DbPool,
}

impl DieselUserBadgeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserBadgeRepositoryError {
    map_pool_error(error, UserBadgeRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserBadgeRepositoryError {
    map_diesel_error(
        error,
        UserBadgeRepositoryError::query,
        UserBadgeRepositoryError::connection,
    )
}

fn row_to_fact(row: UserBadgeRow) -> UserBadge {
    UserBadge {
        user_id: UserId::from_uuid(row.user_id),
        badge_id: row.badge_id,
        earned_at: row.earned_at,
    }
}

#[async_trait]
impl UserBadgeRepository for DieselUserBadgeRepository {
    async fn record_if_absent(
        &self,
        badge: &UserBadge,
    ) -> Result<bool, UserBadgeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = UserBadgeRow {
            user_id: *badge.user_id.as_uuid(),
            badge_id: badge.badge_id,
            earned_at: badge.earned_at,
        };

        let inserted = diesel::insert_into(user_badges::table)
            .values(&row)
            .on_conflict((user_badges::user_id, user_badges::badge_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(inserted > 0)
    }

    async fn earned_badge_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, UserBadgeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        user_badges::table
            .filter(user_badges::user_id.eq(user_id.as_uuid()))
            .select(user_badges::badge_id)
            .load::<Uuid>(&mut conn)
            .await
            .map_err(map_diesel)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserBadge>, UserBadgeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows = user_badges::table
            .filter(user_badges::user_id.eq(user_id.as_uuid()))
            .order(user_badges::earned_at.asc())
            .select(UserBadgeRow::as_select())
            .load::<UserBadgeRow>(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows.into_iter().map(row_to_fact).collect())
    }
}
