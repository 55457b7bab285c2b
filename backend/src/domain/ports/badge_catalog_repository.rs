//! Port for the badge definition catalog.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::badge::BadgeDefinition;

use super::define_port_error;

define_port_error! {
    /// Errors raised by badge catalog adapters.
    pub enum BadgeCatalogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "badge catalog connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "badge catalog query failed: {message}",
        /// A badge with the same identifier already exists.
        DuplicateBadge { badge_id: Uuid } =>
            "badge {badge_id} already exists",
    }
}

/// Port for reading and administering badge definitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeCatalogRepository: Send + Sync {
    /// List the full catalog.
    async fn list(&self) -> Result<Vec<BadgeDefinition>, BadgeCatalogRepositoryError>;

    /// Look up one badge by id.
    async fn find(
        &self,
        badge_id: &Uuid,
    ) -> Result<Option<BadgeDefinition>, BadgeCatalogRepositoryError>;

    /// Insert a new badge; fails with
    /// [`BadgeCatalogRepositoryError::DuplicateBadge`] on id collision.
    async fn insert(&self, badge: &BadgeDefinition) -> Result<(), BadgeCatalogRepositoryError>;

    /// Replace an existing badge. Returns `false` when no badge with that id
    /// exists.
    async fn update(&self, badge: &BadgeDefinition) -> Result<bool, BadgeCatalogRepositoryError>;

    /// Delete a badge. Returns `false` when no badge with that id exists.
    /// Earned `UserBadge` facts are never touched.
    async fn delete(&self, badge_id: &Uuid) -> Result<bool, BadgeCatalogRepositoryError>;
}
