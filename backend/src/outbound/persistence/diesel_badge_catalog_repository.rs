//! PostgreSQL-backed `BadgeCatalogRepository` implementation using Diesel ORM.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::badge::{BadgeDefinition, BadgeDefinitionDraft, UnlockRule};
use crate::domain::ports::{BadgeCatalogRepository, BadgeCatalogRepositoryError};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{BadgeDefinitionRow, BadgeDefinitionUpdate, NewBadgeDefinitionRow};
use super::pool::{DbPool, PoolError};
use super::schema::badge_definitions;

/// Diesel-backed implementation of the badge catalog port.
#[derive(Clone)]
pub struct DieselBadgeCatalogRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselBadgeCatalogRepository {
    /// Create a new repository with the given connection pool and clock.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool(error: PoolError) -> BadgeCatalogRepositoryError {
    map_pool_error(error, BadgeCatalogRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> BadgeCatalogRepositoryError {
    map_diesel_error(
        error,
        BadgeCatalogRepositoryError::query,
        BadgeCatalogRepositoryError::connection,
    )
}

fn row_to_badge(row: BadgeDefinitionRow) -> Result<BadgeDefinition, BadgeCatalogRepositoryError> {
    let unlock_rule: UnlockRule = serde_json::from_value(row.unlock_rule)
        .map_err(|err| BadgeCatalogRepositoryError::query(format!("decode unlock rule: {err}")))?;
    let chips_reward = u32::try_from(row.chips_reward).map_err(|_| {
        BadgeCatalogRepositoryError::query(format!("negative chips reward {}", row.chips_reward))
    })?;

    BadgeDefinition::new(BadgeDefinitionDraft {
        badge_id: row.badge_id,
        name: row.name,
        description: row.description,
        icon: row.icon,
        chips_reward,
        unlock_rule,
    })
    .map_err(|err| BadgeCatalogRepositoryError::query(err.to_string()))
}

fn badge_fields(
    badge: &BadgeDefinition,
) -> Result<(i32, serde_json::Value), BadgeCatalogRepositoryError> {
    let chips_reward = i32::try_from(badge.chips_reward()).map_err(|_| {
        BadgeCatalogRepositoryError::query("chips reward exceeds storage range")
    })?;
    let unlock_rule = serde_json::to_value(badge.unlock_rule())
        .map_err(|err| BadgeCatalogRepositoryError::query(format!("encode unlock rule: {err}")))?;
    Ok((chips_reward, unlock_rule))
}

#[async_trait]
impl BadgeCatalogRepository for DieselBadgeCatalogRepository {
    async fn list(&self) -> Result<Vec<BadgeDefinition>, BadgeCatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows = badge_definitions::table
            .order(badge_definitions::created_at.asc())
            .select(BadgeDefinitionRow::as_select())
            .load::<BadgeDefinitionRow>(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_badge).collect()
    }

    async fn find(
        &self,
        badge_id: &Uuid,
    ) -> Result<Option<BadgeDefinition>, BadgeCatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = badge_definitions::table
            .find(badge_id)
            .select(BadgeDefinitionRow::as_select())
            .first::<BadgeDefinitionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_badge).transpose()
    }

    async fn insert(&self, badge: &BadgeDefinition) -> Result<(), BadgeCatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let (chips_reward, unlock_rule) = badge_fields(badge)?;
        let row = NewBadgeDefinitionRow {
            badge_id: badge.badge_id(),
            name: badge.name().to_owned(),
            description: badge.description().to_owned(),
            icon: badge.icon().to_owned(),
            chips_reward,
            unlock_rule,
            created_at: self.clock.utc(),
        };

        diesel::insert_into(badge_definitions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    BadgeCatalogRepositoryError::duplicate_badge(badge.badge_id())
                } else {
                    map_diesel(error)
                }
            })?;
        Ok(())
    }

    async fn update(&self, badge: &BadgeDefinition) -> Result<bool, BadgeCatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let (chips_reward, unlock_rule) = badge_fields(badge)?;
        let changes = BadgeDefinitionUpdate {
            name: badge.name().to_owned(),
            description: badge.description().to_owned(),
            icon: badge.icon().to_owned(),
            chips_reward,
            unlock_rule,
        };

        let updated = diesel::update(badge_definitions::table.find(badge.badge_id()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(updated > 0)
    }

    async fn delete(&self, badge_id: &Uuid) -> Result<bool, BadgeCatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let deleted = diesel::delete(badge_definitions::table.find(badge_id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn row_round_trips_into_a_badge() {
        let row = BadgeDefinitionRow {
            badge_id: Uuid::new_v4(),
            name: "Profile Master".to_owned(),
            description: "Reach a 100 chip balance".to_owned(),
            icon: "trophy".to_owned(),
            chips_reward: 50,
            unlock_rule: serde_json::json!({ "kind": "balance_at_least", "threshold": 100 }),
            created_at: Utc::now(),
        };

        let badge = row_to_badge(row).expect("valid row");
        assert_eq!(badge.chips_reward(), 50);
        assert_eq!(
            badge.unlock_rule(),
            UnlockRule::BalanceAtLeast { threshold: 100 }
        );
    }

    #[rstest]
    fn malformed_rules_surface_as_query_errors() {
        let row = BadgeDefinitionRow {
            badge_id: Uuid::new_v4(),
            name: "Broken".to_owned(),
            description: String::new(),
            icon: "question".to_owned(),
            chips_reward: 0,
            unlock_rule: serde_json::json!({ "kind": "wish_upon_a_star" }),
            created_at: Utc::now(),
        };
        assert!(row_to_badge(row).is_err());
    }
}
