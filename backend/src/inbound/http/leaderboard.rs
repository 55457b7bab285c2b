//! Leaderboard HTTP handlers.
//!
//! ```text
//! GET /api/v1/leaderboard?offset=0&limit=25
//! ```

use actix_web::{get, web};
use pagination::{PageEnvelope, PageRequest, PageRequestError};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::leaderboard::LeaderboardEntry;
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters for the leaderboard listing.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQueryParams {
    /// First item index of the requested page.
    pub offset: Option<u64>,
    /// Maximum number of items to return; clamped server-side.
    pub limit: Option<u32>,
}

/// OpenAPI schema for the leaderboard page envelope.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LeaderboardPageSchema {
    /// Ranked rows, balance descending.
    items: Vec<crate::inbound::http::schemas::LeaderboardEntrySchema>,
    /// Offset the page starts at.
    offset: u64,
    /// Limit the page was cut with.
    limit: u32,
    /// Total ranked users at snapshot time.
    total: u64,
    /// Continuation token for the next page, absent on the final page.
    next: Option<String>,
}

fn map_page_request_error(error: PageRequestError) -> Error {
    match error {
        PageRequestError::ZeroLimit => Error::invalid_request("limit must be at least 1")
            .with_details(json!({ "field": "limit", "code": "zero_limit" })),
    }
}

/// One page of the leaderboard, balance descending.
///
/// The view is eventually consistent: it may lag ledger appends by a few
/// seconds, but every response is cut from a single snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    params(LeaderboardQueryParams),
    responses(
        (status = 200, description = "Leaderboard page", body = LeaderboardPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "getLeaderboard"
)]
#[get("/leaderboard")]
pub async fn get_leaderboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LeaderboardQueryParams>,
) -> ApiResult<web::Json<PageEnvelope<LeaderboardEntry>>> {
    session.require_actor()?;
    let request =
        PageRequest::from_params(query.offset, query.limit).map_err(map_page_request_error)?;

    let envelope = state.leaderboard.get_page(request).await?;
    Ok(web::Json(envelope))
}
