//! Port for earned-badge facts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::badge::UserBadge;

use super::define_port_error;

define_port_error! {
    /// Errors raised by user badge adapters.
    pub enum UserBadgeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user badge repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user badge repository query failed: {message}",
    }
}

/// Port for recording and reading earned badges.
///
/// `(user, badge)` uniqueness lives here: [`UserBadgeRepository::record_if_absent`]
/// is the only write, and it refuses duplicates without erroring, which is
/// what makes repeated unlock evaluation idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserBadgeRepository: Send + Sync {
    /// Record an earned badge unless the user already holds it. Returns
    /// whether this call inserted the fact.
    async fn record_if_absent(&self, badge: &UserBadge)
    -> Result<bool, UserBadgeRepositoryError>;

    /// Badge ids the user has already earned.
    async fn earned_badge_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, UserBadgeRepositoryError>;

    /// Full earned-badge facts for a user, oldest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserBadge>, UserBadgeRepositoryError>;
}
