//! Badge catalog HTTP handlers.
//!
//! ```text
//! GET    /api/v1/badges/catalog
//! POST   /api/v1/badges/catalog          (admin)
//! PUT    /api/v1/badges/catalog/{id}     (admin)
//! DELETE /api/v1/badges/catalog/{id}     (admin)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::badge::{BadgeDefinitionDraft, UnlockRule};
use crate::domain::ports::{
    BadgeFields, CreateBadgeRequest, DeleteBadgeRequest, UpdateBadgeRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for creating or replacing a badge.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeFieldsBody {
    /// Display name.
    pub name: String,
    /// Longer description shown in the catalog.
    pub description: String,
    /// Icon identifier rendered by clients.
    pub icon: String,
    /// Chips credited when the badge unlocks; zero means purely cosmetic.
    pub chips_reward: u32,
    /// Predicate deciding when the badge unlocks, e.g.
    /// `{"kind": "balance_at_least", "threshold": 100}`.
    #[schema(value_type = Object)]
    pub unlock_rule: UnlockRule,
}

impl From<BadgeFieldsBody> for BadgeFields {
    fn from(value: BadgeFieldsBody) -> Self {
        Self {
            name: value.name,
            description: value.description,
            icon: value.icon,
            chips_reward: value.chips_reward,
            unlock_rule: value.unlock_rule,
        }
    }
}

/// Catalog entry response payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeResponseBody {
    /// Stable badge identifier.
    #[schema(format = "uuid")]
    pub badge_id: String,
    /// Display name.
    pub name: String,
    /// Longer description shown in the catalog.
    pub description: String,
    /// Icon identifier rendered by clients.
    pub icon: String,
    /// Chips credited when the badge unlocks.
    pub chips_reward: u32,
    /// Predicate deciding when the badge unlocks.
    #[schema(value_type = Object)]
    pub unlock_rule: UnlockRule,
}

impl From<BadgeDefinitionDraft> for BadgeResponseBody {
    fn from(value: BadgeDefinitionDraft) -> Self {
        Self {
            badge_id: value.badge_id.to_string(),
            name: value.name,
            description: value.description,
            icon: value.icon,
            chips_reward: value.chips_reward,
            unlock_rule: value.unlock_rule,
        }
    }
}

/// List the badge catalog.
#[utoipa::path(
    get,
    path = "/api/v1/badges/catalog",
    responses(
        (status = 200, description = "Catalog entries", body = [BadgeResponseBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["badges"],
    operation_id = "listBadgeCatalog"
)]
#[get("/badges/catalog")]
pub async fn list_catalog(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<BadgeResponseBody>>> {
    session.require_actor()?;
    let catalog = state.badge_catalog.list_catalog().await?;
    Ok(web::Json(catalog.into_iter().map(Into::into).collect()))
}

/// Create a badge (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/badges/catalog",
    request_body = BadgeFieldsBody,
    responses(
        (status = 201, description = "Badge created", body = BadgeResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["badges"],
    operation_id = "createBadge"
)]
#[post("/badges/catalog")]
pub async fn create_badge(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BadgeFieldsBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_admin()?;
    let created = state
        .badge_admin
        .create_badge(CreateBadgeRequest {
            actor,
            fields: payload.into_inner().into(),
        })
        .await?;
    Ok(HttpResponse::Created().json(BadgeResponseBody::from(created)))
}

/// Replace a badge's fields (admin only).
#[utoipa::path(
    put,
    path = "/api/v1/badges/catalog/{id}",
    params(("id" = String, Path, format = "uuid", description = "Badge identifier")),
    request_body = BadgeFieldsBody,
    responses(
        (status = 200, description = "Badge updated", body = BadgeResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Badge not found", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["badges"],
    operation_id = "updateBadge"
)]
#[put("/badges/catalog/{id}")]
pub async fn update_badge(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BadgeFieldsBody>,
) -> ApiResult<web::Json<BadgeResponseBody>> {
    let actor = session.require_admin()?;
    let badge_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let updated = state
        .badge_admin
        .update_badge(UpdateBadgeRequest {
            actor,
            badge_id,
            fields: payload.into_inner().into(),
        })
        .await?;
    Ok(web::Json(updated.into()))
}

/// Delete a badge from the catalog (admin only).
///
/// Earned badges and their ledger entries are never deleted; removal only
/// stops future unlocks.
#[utoipa::path(
    delete,
    path = "/api/v1/badges/catalog/{id}",
    params(("id" = String, Path, format = "uuid", description = "Badge identifier")),
    responses(
        (status = 204, description = "Badge deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Badge not found", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["badges"],
    operation_id = "deleteBadge"
)]
#[delete("/badges/catalog/{id}")]
pub async fn delete_badge(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_admin()?;
    let badge_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state
        .badge_admin
        .delete_badge(DeleteBadgeRequest { actor, badge_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
