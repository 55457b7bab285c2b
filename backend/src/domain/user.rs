//! User identity and actor context primitives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier string was empty.
    EmptyId,
    /// The identifier string was not a valid UUID.
    InvalidId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
///
/// The identity provider issues these; this service never mints user ids of
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::EmptyId`] for empty input and
    /// [`UserValidationError::InvalidId`] when the input is not a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Construct a [`UserId`] directly from a UUID.
    ///
    /// Useful when the UUID is already validated (e.g., loaded from the
    /// database).
    pub fn from_uuid(uuid: Uuid) -> Self {
        let raw = uuid.to_string();
        Self(uuid, raw)
    }

    /// Generate a new random [`UserId`].
    ///
    /// Primarily useful for testing.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role attached to the authenticated actor by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Regular platform member.
    Member,
    /// Back-office administrator.
    Admin,
}

/// Error returned when parsing an [`ActorRole`] from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseActorRoleError;

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => f.write_str("member"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

impl fmt::Display for ParseActorRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid actor role")
    }
}

impl std::error::Error for ParseActorRoleError {}

impl FromStr for ActorRole {
    type Err = ParseActorRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseActorRoleError),
        }
    }
}

/// Authenticated actor performing an operation.
///
/// Carried on every driving-port request so services can enforce role and
/// ownership rules without reaching back into transport-layer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// The actor's user identifier.
    pub id: UserId,
    /// The actor's role.
    pub role: ActorRole,
}

impl Actor {
    /// Construct a member actor.
    pub fn member(id: UserId) -> Self {
        Self {
            id,
            role: ActorRole::Member,
        }
    }

    /// Construct an admin actor.
    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            role: ActorRole::Admin,
        }
    }

    /// Whether this actor carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}
