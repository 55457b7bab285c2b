//! Badge catalog administration service.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::badge::{BadgeDefinition, BadgeDefinitionDraft};
use crate::domain::ports::{
    BadgeCatalogCommand, BadgeCatalogQuery, BadgeCatalogRepository, BadgeCatalogRepositoryError,
    BadgeFields, CreateBadgeRequest, DeleteBadgeRequest, UpdateBadgeRequest,
};
use crate::domain::{Actor, Error};

fn map_repository_error(error: BadgeCatalogRepositoryError) -> Error {
    match error {
        BadgeCatalogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("badge catalog unavailable: {message}"))
        }
        BadgeCatalogRepositoryError::Query { message } => {
            Error::internal(format!("badge catalog error: {message}"))
        }
        BadgeCatalogRepositoryError::DuplicateBadge { badge_id } => {
            Error::conflict(format!("badge {badge_id} already exists"))
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), Error> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("badge catalog changes require the admin role"))
    }
}

fn build_definition(badge_id: Uuid, fields: BadgeFields) -> Result<BadgeDefinition, Error> {
    let BadgeFields {
        name,
        description,
        icon,
        chips_reward,
        unlock_rule,
    } = fields;
    BadgeDefinition::new(BadgeDefinitionDraft {
        badge_id,
        name,
        description,
        icon,
        chips_reward,
        unlock_rule,
    })
    .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Badge catalog service implementing the admin command and public query
/// driving ports.
#[derive(Clone)]
pub struct BadgeAdminService<C> {
    catalog: Arc<C>,
}

impl<C> BadgeAdminService<C> {
    /// Create a service over the catalog repository.
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<C> BadgeCatalogCommand for BadgeAdminService<C>
where
    C: BadgeCatalogRepository,
{
    async fn create_badge(
        &self,
        request: CreateBadgeRequest,
    ) -> Result<BadgeDefinitionDraft, Error> {
        require_admin(&request.actor)?;
        let badge = build_definition(Uuid::new_v4(), request.fields)?;
        self.catalog
            .insert(&badge)
            .await
            .map_err(map_repository_error)?;
        Ok(badge.into())
    }

    async fn update_badge(
        &self,
        request: UpdateBadgeRequest,
    ) -> Result<BadgeDefinitionDraft, Error> {
        require_admin(&request.actor)?;
        let badge = build_definition(request.badge_id, request.fields)?;
        let found = self
            .catalog
            .update(&badge)
            .await
            .map_err(map_repository_error)?;
        if !found {
            return Err(Error::not_found(format!(
                "badge {} not found",
                request.badge_id
            )));
        }
        Ok(badge.into())
    }

    async fn delete_badge(&self, request: DeleteBadgeRequest) -> Result<(), Error> {
        require_admin(&request.actor)?;
        let found = self
            .catalog
            .delete(&request.badge_id)
            .await
            .map_err(map_repository_error)?;
        if !found {
            return Err(Error::not_found(format!(
                "badge {} not found",
                request.badge_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<C> BadgeCatalogQuery for BadgeAdminService<C>
where
    C: BadgeCatalogRepository,
{
    async fn list_catalog(&self) -> Result<Vec<BadgeDefinitionDraft>, Error> {
        let catalog = self.catalog.list().await.map_err(map_repository_error)?;
        Ok(catalog.into_iter().map(Into::into).collect())
    }
}
