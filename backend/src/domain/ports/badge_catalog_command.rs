//! Driving ports for badge catalog reads and administration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::badge::{BadgeDefinitionDraft, UnlockRule};
use crate::domain::{Actor, Error};

/// Fields for creating or replacing a badge definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeFields {
    /// Display name.
    pub name: String,
    /// Longer description shown in the catalog.
    pub description: String,
    /// Icon identifier rendered by clients.
    pub icon: String,
    /// Chips credited when the badge unlocks; zero means purely cosmetic.
    pub chips_reward: u32,
    /// Predicate deciding when the badge unlocks.
    pub unlock_rule: UnlockRule,
}

/// Request to create a badge; the service mints the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBadgeRequest {
    /// Authenticated actor; must be an admin.
    pub actor: Actor,
    /// Badge fields.
    pub fields: BadgeFields,
}

/// Request to replace an existing badge's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBadgeRequest {
    /// Authenticated actor; must be an admin.
    pub actor: Actor,
    /// Badge to replace.
    pub badge_id: Uuid,
    /// Replacement fields.
    pub fields: BadgeFields,
}

/// Request to delete a badge from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBadgeRequest {
    /// Authenticated actor; must be an admin.
    pub actor: Actor,
    /// Badge to delete.
    pub badge_id: Uuid,
}

/// Driving port for admin-only catalog mutations.
///
/// Deleting a badge never deletes earned-badge facts or reverses ledger
/// entries; it only stops future unlocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeCatalogCommand: Send + Sync {
    /// Create a badge and return its catalog entry.
    async fn create_badge(
        &self,
        request: CreateBadgeRequest,
    ) -> Result<BadgeDefinitionDraft, Error>;

    /// Replace a badge's fields and return the updated catalog entry.
    async fn update_badge(
        &self,
        request: UpdateBadgeRequest,
    ) -> Result<BadgeDefinitionDraft, Error>;

    /// Delete a badge from the catalog.
    async fn delete_badge(&self, request: DeleteBadgeRequest) -> Result<(), Error>;
}

/// Driving port for reading the catalog; open to every authenticated actor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeCatalogQuery: Send + Sync {
    /// The full badge catalog.
    async fn list_catalog(&self) -> Result<Vec<BadgeDefinitionDraft>, Error>;
}
