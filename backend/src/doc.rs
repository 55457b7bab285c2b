//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (ledger, users,
//!   leaderboard, badges, referrals, health)
//! - **Schemas**: Domain type wrappers from the inbound `schemas` module plus
//!   the request/response bodies, keeping domain types free of utoipa
//!   coupling
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::badges::{BadgeFieldsBody, BadgeResponseBody};
use crate::inbound::http::leaderboard::LeaderboardPageSchema;
use crate::inbound::http::ledger::{
    RecordChipEventBody, RecordChipEventResponseBody, UnlockedBadgeBody,
};
use crate::inbound::http::referrals::{
    AttributeReferralBody, AttributeReferralResponseBody, CompleteReferralResponseBody,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, LeaderboardEntrySchema, TierSchema,
};
use crate::inbound::http::users::{BalanceResponseBody, RankResponseBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the identity provider's callback.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Chip rewards ledger API",
        description = "Atomic chip ledger with badge unlocks, referral tiers, and a dense-ranked leaderboard.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::ledger::record_chip_event,
        crate::inbound::http::users::get_balance,
        crate::inbound::http::users::get_rank,
        crate::inbound::http::leaderboard::get_leaderboard,
        crate::inbound::http::badges::list_catalog,
        crate::inbound::http::badges::create_badge,
        crate::inbound::http::badges::update_badge,
        crate::inbound::http::badges::delete_badge,
        crate::inbound::http::referrals::attribute_referral,
        crate::inbound::http::referrals::complete_referral,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        TierSchema,
        LeaderboardEntrySchema,
        LeaderboardPageSchema,
        RecordChipEventBody,
        RecordChipEventResponseBody,
        UnlockedBadgeBody,
        BalanceResponseBody,
        RankResponseBody,
        BadgeFieldsBody,
        BadgeResponseBody,
        AttributeReferralBody,
        AttributeReferralResponseBody,
        CompleteReferralResponseBody,
    )),
    tags(
        (name = "ledger", description = "Chip event writes"),
        (name = "users", description = "Per-user balance and rank reads"),
        (name = "leaderboard", description = "Ranked listing over projected balances"),
        (name = "badges", description = "Badge catalog reads and administration"),
        (name = "referrals", description = "Referral attribution and crediting"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
