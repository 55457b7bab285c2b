//! Referral domain service: attribution and crediting.
//!
//! Crediting routes through the chip ledger command rather than writing any
//! balance directly; the `referral_credit` entry is keyed by the referee id,
//! so completing the same referral twice can never double-credit the
//! referrer.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    AttributeReferralRequest, AttributeReferralResponse, ChipLedgerCommand,
    CompleteReferralRequest, CompleteReferralResponse, RecordChipEventRequest, ReferralCommand,
    ReferralRepository, ReferralRepositoryError,
};
use crate::domain::referral::{ReferralEdge, ReferralValidationError};
use crate::domain::{ChipReason, Error};

/// Chips credited to the referrer for each completed referral.
pub const REFERRAL_CREDIT_CHIPS: i64 = 100;

fn map_repository_error(error: ReferralRepositoryError) -> Error {
    match error {
        ReferralRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("referral repository unavailable: {message}"))
        }
        ReferralRepositoryError::Query { message } => {
            Error::internal(format!("referral repository error: {message}"))
        }
        ReferralRepositoryError::Corrupt { message } => {
            Error::internal(format!("referral repository returned corrupt data: {message}"))
        }
    }
}

fn map_validation_error(error: ReferralValidationError) -> Error {
    match error {
        ReferralValidationError::SelfReferral => {
            Error::invalid_request("a user cannot refer themselves")
        }
    }
}

/// Referral service implementing the referral driving port.
#[derive(Clone)]
pub struct ReferralService<R, L> {
    referrals: Arc<R>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<R, L> ReferralService<R, L> {
    /// Create a service over the referral repository and ledger command.
    pub fn new(referrals: Arc<R>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            referrals,
            ledger,
            clock,
        }
    }
}

#[async_trait]
impl<R, L> ReferralCommand for ReferralService<R, L>
where
    R: ReferralRepository,
    L: ChipLedgerCommand,
{
    async fn attribute(
        &self,
        request: AttributeReferralRequest,
    ) -> Result<AttributeReferralResponse, Error> {
        let edge = ReferralEdge::new(
            request.actor.id.clone(),
            request.referee_id.clone(),
            self.clock.utc(),
        )
        .map_err(map_validation_error)?;

        let outcome = self
            .referrals
            .attribute(edge)
            .await
            .map_err(map_repository_error)?;

        Ok(AttributeReferralResponse {
            referrer_id: outcome.edge().referrer_id().clone(),
            referee_id: outcome.edge().referee_id().clone(),
            already_attributed: outcome.is_already_attributed(),
        })
    }

    async fn complete(
        &self,
        request: CompleteReferralRequest,
    ) -> Result<CompleteReferralResponse, Error> {
        if !request.actor.is_admin() {
            return Err(Error::forbidden(
                "completing referrals requires the admin role",
            ));
        }

        let edge = self
            .referrals
            .mark_credited(&request.referee_id, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "user {} has no referral attribution",
                    request.referee_id
                ))
            })?;

        // The ledger entry is the durable credit; `mark_credited` above is
        // bookkeeping. Keying by referee id means a crashed or retried
        // completion converges instead of paying twice.
        let response = self
            .ledger
            .record_chip_event(RecordChipEventRequest {
                actor: request.actor,
                user_id: edge.referrer_id().clone(),
                amount: REFERRAL_CREDIT_CHIPS,
                reason: ChipReason::ReferralCredit,
                source_ref: Some(request.referee_id.to_string()),
            })
            .await?;

        Ok(CompleteReferralResponse {
            referrer_id: edge.referrer_id().clone(),
            credited: !response.duplicate,
        })
    }
}

#[cfg(test)]
#[path = "referral_service_tests.rs"]
mod tests;
