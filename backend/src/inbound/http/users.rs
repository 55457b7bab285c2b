//! Per-user balance and rank HTTP handlers.
//!
//! ```text
//! GET /api/v1/users/{id}/balance
//! GET /api/v1/users/{id}/rank
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Tier, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Response payload for a balance read.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponseBody {
    /// Projected chip balance.
    pub balance: i64,
    /// Referral tier.
    #[schema(value_type = crate::inbound::http::schemas::TierSchema)]
    pub tier: Tier,
}

/// Response payload for a rank read.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankResponseBody {
    /// Dense rank, starting at 1.
    pub rank: u32,
}

/// Current balance and tier for a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/balance",
    params(("id" = String, Path, format = "uuid", description = "User identifier")),
    responses(
        (status = 200, description = "Balance", body = BalanceResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getBalance"
)]
#[get("/users/{id}/balance")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BalanceResponseBody>> {
    session.require_actor()?;
    let user_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;

    let payload = state
        .balances
        .get_balance(&UserId::from_uuid(user_id))
        .await?;

    Ok(web::Json(BalanceResponseBody {
        balance: payload.balance,
        tier: payload.tier,
    }))
}

/// Dense leaderboard rank for a user.
///
/// Served from the same bounded-staleness snapshot as the leaderboard
/// listing, so the two always agree.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/rank",
    params(("id" = String, Path, format = "uuid", description = "User identifier")),
    responses(
        (status = 200, description = "Rank", body = RankResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User has no ranked balance", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getRank"
)]
#[get("/users/{id}/rank")]
pub async fn get_rank(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RankResponseBody>> {
    session.require_actor()?;
    let user_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;

    let payload = state.leaderboard.get_rank(&UserId::from_uuid(user_id)).await?;

    Ok(web::Json(RankResponseBody { rank: payload.rank }))
}
