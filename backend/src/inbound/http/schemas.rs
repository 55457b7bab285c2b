//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with concurrent state changes.
    #[schema(rename = "conflict")]
    Conflict,
    /// A required dependency is temporarily unavailable; safe to retry.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Something went wrong")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Tier`].
///
/// Referral-count tier classification.
#[derive(ToSchema)]
#[schema(as = crate::domain::Tier)]
pub enum TierSchema {
    /// 0–5 credited referrals.
    #[schema(rename = "bronze")]
    Bronze,
    /// 6–15 credited referrals.
    #[schema(rename = "silver")]
    Silver,
    /// 16–50 credited referrals.
    #[schema(rename = "gold")]
    Gold,
    /// 51+ credited referrals.
    #[schema(rename = "platinum")]
    Platinum,
}

/// OpenAPI schema for [`crate::domain::LeaderboardEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::LeaderboardEntry)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LeaderboardEntrySchema {
    /// The ranked user.
    #[schema(format = "uuid")]
    user_id: String,
    /// Projected chip balance at snapshot time.
    balance: i64,
    /// Dense rank, starting at 1.
    rank: u32,
}
