//! Port for the external identity provider's user directory.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// The directory is unreachable or timing out.
        Unavailable { message: String } =>
            "user directory unavailable: {message}",
    }
}

/// Port answering whether a user id is known to the identity provider.
///
/// The ledger never mints users; an append for an unknown user is fatal
/// rather than retried, so the check happens before anything is written.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether the user exists.
    async fn exists(&self, user_id: &UserId) -> Result<bool, UserDirectoryError>;
}

/// Fixture directory that recognizes every user id.
///
/// Used by single-instance deployments where the session cookie is the only
/// identity signal, and by tests that do not exercise directory failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllUserDirectory;

#[async_trait]
impl UserDirectory for AllowAllUserDirectory {
    async fn exists(&self, _user_id: &UserId) -> Result<bool, UserDirectoryError> {
        Ok(true)
    }
}
