//! Port for balance projection state.

use async_trait::async_trait;

use crate::domain::UserId;
use crate::domain::projection::BalanceProjection;

use super::define_port_error;

define_port_error! {
    /// Errors raised by projection repository adapters.
    pub enum ProjectionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "projection repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "projection repository query failed: {message}",
    }
}

/// Port for reading and writing the projector's derived state.
///
/// Only the projector writes through this port; saves happen inside the
/// per-user append scope, so a plain upsert is race-free by construction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectionRepository: Send + Sync {
    /// Load a user's projection, if one has been created.
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BalanceProjection>, ProjectionRepositoryError>;

    /// Upsert a projection.
    async fn save(&self, projection: &BalanceProjection)
    -> Result<(), ProjectionRepositoryError>;

    /// Load every projection; used to rebuild the leaderboard snapshot.
    async fn list_all(&self) -> Result<Vec<BalanceProjection>, ProjectionRepositoryError>;
}
