//! Badge rule engine: evaluates unlock predicates against projection state.
//!
//! The engine is deliberately stateless. It answers "which catalog badges
//! does this projection newly satisfy" and records earned facts; deciding
//! when to evaluate, and crediting rewards through the ledger, belongs to
//! the ledger service so the whole unit runs inside one per-user scope.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Error;
use crate::domain::badge::{BadgeDefinition, UserBadge};
use crate::domain::ports::{
    BadgeCatalogRepository, BadgeCatalogRepositoryError, UserBadgeRepository,
    UserBadgeRepositoryError,
};
use crate::domain::projection::BalanceProjection;

fn map_catalog_error(error: BadgeCatalogRepositoryError) -> Error {
    match error {
        BadgeCatalogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("badge catalog unavailable: {message}"))
        }
        BadgeCatalogRepositoryError::Query { message } => {
            Error::internal(format!("badge catalog error: {message}"))
        }
        BadgeCatalogRepositoryError::DuplicateBadge { badge_id } => {
            Error::internal(format!("unexpected duplicate badge {badge_id}"))
        }
    }
}

fn map_user_badge_error(error: UserBadgeRepositoryError) -> Error {
    match error {
        UserBadgeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user badge repository unavailable: {message}"))
        }
        UserBadgeRepositoryError::Query { message } => {
            Error::internal(format!("user badge repository error: {message}"))
        }
    }
}

/// Evaluates unlock rules and records earned badges exactly once.
#[derive(Clone)]
pub struct BadgeRuleEngine<C, B> {
    catalog: Arc<C>,
    user_badges: Arc<B>,
}

impl<C, B> BadgeRuleEngine<C, B> {
    /// Create an engine over the catalog and earned-badge repositories.
    pub fn new(catalog: Arc<C>, user_badges: Arc<B>) -> Self {
        Self {
            catalog,
            user_badges,
        }
    }
}

impl<C, B> BadgeRuleEngine<C, B>
where
    C: BadgeCatalogRepository,
    B: UserBadgeRepository,
{
    /// Catalog badges the projection satisfies and the user does not hold.
    ///
    /// Evaluates every rule against the single snapshot it is handed; the
    /// caller decides whether reward credits warrant a follow-up pass with a
    /// fresh snapshot.
    pub async fn newly_unlockable(
        &self,
        projection: &BalanceProjection,
    ) -> Result<Vec<BadgeDefinition>, Error> {
        let catalog = self.catalog.list().await.map_err(map_catalog_error)?;
        let earned: HashSet<Uuid> = self
            .user_badges
            .earned_badge_ids(projection.user_id())
            .await
            .map_err(map_user_badge_error)?
            .into_iter()
            .collect();

        Ok(catalog
            .into_iter()
            .filter(|badge| {
                !earned.contains(&badge.badge_id()) && badge.unlock_rule().is_met(projection)
            })
            .collect())
    }

    /// Record an earned badge unless the user already holds it.
    ///
    /// Returns whether this call inserted the fact; `false` means a
    /// concurrent or earlier evaluation won, which callers treat as success.
    pub async fn record_earned(&self, badge: &UserBadge) -> Result<bool, Error> {
        self.user_badges
            .record_if_absent(badge)
            .await
            .map_err(map_user_badge_error)
    }
}

#[cfg(test)]
#[path = "badge_engine_tests.rs"]
mod tests;
