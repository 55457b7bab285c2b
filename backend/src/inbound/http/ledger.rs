//! Chip ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/ledger/entries
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{RecordChipEventRequest, RecordChipEventResponse};
use crate::domain::{ChipReason, Tier};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_enum, parse_uuid};

/// Request payload for recording a chip event.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordChipEventBody {
    /// User whose balance the event affects.
    #[schema(format = "uuid")]
    pub user_id: String,
    /// Signed chip delta; positive credits, negative debits.
    pub amount: i64,
    /// Ledger reason, e.g. `profile_completion` or `prompt_approved`.
    pub reason: String,
    /// Identifier of the triggering object; required for every reason except
    /// `admin_adjustment`.
    pub source_ref: Option<String>,
}

/// A badge unlocked by the recorded event.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedBadgeBody {
    /// Stable badge identifier.
    #[schema(format = "uuid")]
    pub badge_id: String,
    /// Display name at unlock time.
    pub name: String,
    /// Chips credited by the unlock.
    pub chips_reward: u32,
}

/// Response payload for a recorded chip event.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordChipEventResponseBody {
    /// Identifier of the recorded (or pre-existing) ledger entry.
    #[schema(format = "uuid")]
    pub entry_id: String,
    /// Balance after the event and any badge rewards it triggered.
    pub balance: i64,
    /// Referral tier after the event.
    #[schema(value_type = TierSchemaRef)]
    pub tier: Tier,
    /// Whether an earlier identical trigger absorbed this request.
    pub duplicate: bool,
    /// Badges unlocked by this request, in unlock order.
    pub newly_unlocked_badges: Vec<UnlockedBadgeBody>,
}

/// Schema alias so utoipa references the shared tier schema.
type TierSchemaRef = crate::inbound::http::schemas::TierSchema;

impl From<RecordChipEventResponse> for RecordChipEventResponseBody {
    fn from(value: RecordChipEventResponse) -> Self {
        Self {
            entry_id: value.entry_id.to_string(),
            balance: value.balance,
            tier: value.tier,
            duplicate: value.duplicate,
            newly_unlocked_badges: value
                .newly_unlocked_badges
                .into_iter()
                .map(|badge| UnlockedBadgeBody {
                    badge_id: badge.badge_id.to_string(),
                    name: badge.name,
                    chips_reward: badge.chips_reward,
                })
                .collect(),
        }
    }
}

/// Record a chip-affecting event for a user.
///
/// Idempotent on `(userId, reason, sourceRef)`: retrying after a timeout
/// returns the original entry with `duplicate: true` and no second credit.
#[utoipa::path(
    post,
    path = "/api/v1/ledger/entries",
    request_body = RecordChipEventBody,
    responses(
        (status = 200, description = "Event recorded (or replayed)", body = RecordChipEventResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Concurrency conflict", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["ledger"],
    operation_id = "recordChipEvent"
)]
#[post("/ledger/entries")]
pub async fn record_chip_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecordChipEventBody>,
) -> ApiResult<web::Json<RecordChipEventResponseBody>> {
    let actor = session.require_actor()?;
    let body = payload.into_inner();

    let user_id = parse_uuid(&body.user_id, FieldName::new("userId"))?;
    let reason: ChipReason = parse_enum(
        &body.reason,
        FieldName::new("reason"),
        "profile_completion, prompt_approved, referral_credit, badge_reward, admin_adjustment, event_reward",
    )?;

    let response = state
        .ledger
        .record_chip_event(RecordChipEventRequest {
            actor,
            user_id: crate::domain::UserId::from_uuid(user_id),
            amount: body.amount,
            reason,
            source_ref: body.source_ref,
        })
        .await?;

    Ok(web::Json(response.into()))
}
