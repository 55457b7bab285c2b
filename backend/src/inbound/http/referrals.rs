//! Referral HTTP handlers.
//!
//! ```text
//! POST /api/v1/referrals                         (claim as the session actor)
//! POST /api/v1/referrals/{refereeId}/complete    (admin)
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserId;
use crate::domain::ports::{AttributeReferralRequest, CompleteReferralRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for claiming a referral.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeReferralBody {
    /// The referred user.
    #[schema(format = "uuid")]
    pub referee_id: String,
}

/// Response payload for an attribution attempt.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeReferralResponseBody {
    /// The winning referrer for the referee.
    #[schema(format = "uuid")]
    pub referrer_id: String,
    /// The referred user.
    #[schema(format = "uuid")]
    pub referee_id: String,
    /// Whether an earlier attribution already claimed the referee.
    pub already_attributed: bool,
}

/// Response payload for crediting a referral.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReferralResponseBody {
    /// The referrer who received (or already held) the credit.
    #[schema(format = "uuid")]
    pub referrer_id: String,
    /// Whether this call performed the credit.
    pub credited: bool,
}

/// Claim a referral: the session actor becomes the referrer.
///
/// First attribution wins; claiming an already-attributed referee reports
/// the existing referrer instead of failing.
#[utoipa::path(
    post,
    path = "/api/v1/referrals",
    request_body = AttributeReferralBody,
    responses(
        (status = 200, description = "Attribution resolved", body = AttributeReferralResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["referrals"],
    operation_id = "attributeReferral"
)]
#[post("/referrals")]
pub async fn attribute_referral(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AttributeReferralBody>,
) -> ApiResult<web::Json<AttributeReferralResponseBody>> {
    let actor = session.require_actor()?;
    let referee_id = parse_uuid(&payload.referee_id, FieldName::new("refereeId"))?;

    let response = state
        .referrals
        .attribute(AttributeReferralRequest {
            actor,
            referee_id: UserId::from_uuid(referee_id),
        })
        .await?;

    Ok(web::Json(AttributeReferralResponseBody {
        referrer_id: response.referrer_id.to_string(),
        referee_id: response.referee_id.to_string(),
        already_attributed: response.already_attributed,
    }))
}

/// Credit a referral after the referee's qualifying action (admin only).
///
/// The chip credit is keyed by the referee id, so repeating the call cannot
/// pay the referrer twice.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/{refereeId}/complete",
    params(("refereeId" = String, Path, format = "uuid", description = "Referred user identifier")),
    responses(
        (status = 200, description = "Referral credited or already credited", body = CompleteReferralResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No attribution for referee", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["referrals"],
    operation_id = "completeReferral"
)]
#[post("/referrals/{referee_id}/complete")]
pub async fn complete_referral(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CompleteReferralResponseBody>> {
    let actor = session.require_admin()?;
    let referee_id = parse_uuid(&path.into_inner(), FieldName::new("refereeId"))?;

    let response = state
        .referrals
        .complete(CompleteReferralRequest {
            actor,
            referee_id: UserId::from_uuid(referee_id),
        })
        .await?;

    Ok(web::Json(CompleteReferralResponseBody {
        referrer_id: response.referrer_id.to_string(),
        credited: response.credited,
    }))
}
