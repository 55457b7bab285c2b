//! In-process badge catalog and earned-badge stores.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::badge::{BadgeDefinition, UserBadge};
use crate::domain::ports::{
    BadgeCatalogRepository, BadgeCatalogRepositoryError, UserBadgeRepository,
    UserBadgeRepositoryError,
};

use super::lock_unpoisoned;

/// In-process [`BadgeCatalogRepository`] preserving insertion order.
#[derive(Default)]
pub struct InMemoryBadgeCatalogRepository {
    badges: Mutex<Vec<BadgeDefinition>>,
}

impl InMemoryBadgeCatalogRepository {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-seeded with the given badges.
    pub fn with_badges(badges: Vec<BadgeDefinition>) -> Self {
        Self {
            badges: Mutex::new(badges),
        }
    }
}

#[async_trait]
impl BadgeCatalogRepository for InMemoryBadgeCatalogRepository {
    async fn list(&self) -> Result<Vec<BadgeDefinition>, BadgeCatalogRepositoryError> {
        Ok(lock_unpoisoned(&self.badges).clone())
    }

    async fn find(
        &self,
        badge_id: &Uuid,
    ) -> Result<Option<BadgeDefinition>, BadgeCatalogRepositoryError> {
        Ok(lock_unpoisoned(&self.badges)
            .iter()
            .find(|badge| badge.badge_id() == *badge_id)
            .cloned())
    }

    async fn insert(&self, badge: &BadgeDefinition) -> Result<(), BadgeCatalogRepositoryError> {
        let mut badges = lock_unpoisoned(&self.badges);
        if badges.iter().any(|b| b.badge_id() == badge.badge_id()) {
            return Err(BadgeCatalogRepositoryError::duplicate_badge(
                badge.badge_id(),
            ));
        }
        badges.push(badge.clone());
        Ok(())
    }

    async fn update(&self, badge: &BadgeDefinition) -> Result<bool, BadgeCatalogRepositoryError> {
        let mut badges = lock_unpoisoned(&self.badges);
        match badges.iter_mut().find(|b| b.badge_id() == badge.badge_id()) {
            Some(slot) => {
                *slot = badge.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, badge_id: &Uuid) -> Result<bool, BadgeCatalogRepositoryError> {
        let mut badges = lock_unpoisoned(&self.badges);
        let before = badges.len();
        badges.retain(|badge| badge.badge_id() != *badge_id);
        Ok(badges.len() != before)
    }
}

/// In-process [`UserBadgeRepository`] enforcing `(user, badge)` uniqueness.
#[derive(Default)]
pub struct InMemoryUserBadgeRepository {
    earned: Mutex<Vec<UserBadge>>,
}

impl InMemoryUserBadgeRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserBadgeRepository for InMemoryUserBadgeRepository {
    async fn record_if_absent(
        &self,
        badge: &UserBadge,
    ) -> Result<bool, UserBadgeRepositoryError> {
        let mut earned = lock_unpoisoned(&self.earned);
        let held = earned
            .iter()
            .any(|fact| fact.user_id == badge.user_id && fact.badge_id == badge.badge_id);
        if held {
            return Ok(false);
        }
        earned.push(badge.clone());
        Ok(true)
    }

    async fn earned_badge_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, UserBadgeRepositoryError> {
        Ok(lock_unpoisoned(&self.earned)
            .iter()
            .filter(|fact| &fact.user_id == user_id)
            .map(|fact| fact.badge_id)
            .collect())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserBadge>, UserBadgeRepositoryError> {
        Ok(lock_unpoisoned(&self.earned)
            .iter()
            .filter(|fact| &fact.user_id == user_id)
            .cloned()
            .collect())
    }
}
