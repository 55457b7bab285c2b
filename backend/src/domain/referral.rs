//! Referral attribution facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Validation errors raised while constructing a [`ReferralEdge`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferralValidationError {
    /// A user attempted to refer themselves.
    #[error("a user cannot refer themselves")]
    SelfReferral,
}

/// Attribution fact linking a referee to the referrer who brought them in.
///
/// One referee maps to at most one referrer (first attribution wins — the
/// repository enforces that); `credited_at` stays empty until the referee
/// completes the qualifying action, at which point the referrer receives a
/// `referral_credit` ledger entry keyed by the referee id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralEdge {
    referrer_id: UserId,
    referee_id: UserId,
    created_at: DateTime<Utc>,
    credited_at: Option<DateTime<Utc>>,
}

impl ReferralEdge {
    /// Validate and construct a fresh, uncredited edge.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralValidationError::SelfReferral`] when referrer and
    /// referee are the same user.
    pub fn new(
        referrer_id: UserId,
        referee_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ReferralValidationError> {
        if referrer_id == referee_id {
            return Err(ReferralValidationError::SelfReferral);
        }
        Ok(Self {
            referrer_id,
            referee_id,
            created_at,
            credited_at: None,
        })
    }

    /// Reconstruct an edge from stored fields.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralValidationError::SelfReferral`] when the stored row
    /// violates the self-referral invariant.
    pub fn from_parts(
        referrer_id: UserId,
        referee_id: UserId,
        created_at: DateTime<Utc>,
        credited_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ReferralValidationError> {
        let mut edge = Self::new(referrer_id, referee_id, created_at)?;
        edge.credited_at = credited_at;
        Ok(edge)
    }

    /// Mark the edge credited at the given instant.
    ///
    /// Idempotent: the first credit timestamp is preserved on repeat calls.
    /// Returns whether this call transitioned the edge.
    pub fn mark_credited(&mut self, at: DateTime<Utc>) -> bool {
        if self.credited_at.is_some() {
            return false;
        }
        self.credited_at = Some(at);
        true
    }

    /// The referring user.
    pub fn referrer_id(&self) -> &UserId {
        &self.referrer_id
    }

    /// The referred user.
    pub fn referee_id(&self) -> &UserId {
        &self.referee_id
    }

    /// When the attribution was recorded.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the referral was credited, if it has been.
    pub fn credited_at(&self) -> Option<DateTime<Utc>> {
        self.credited_at
    }

    /// Whether the referral has been credited.
    pub fn is_credited(&self) -> bool {
        self.credited_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::{Duration, Utc};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rejects_self_referral() {
        let user = UserId::random();
        assert_eq!(
            ReferralEdge::new(user.clone(), user, Utc::now()),
            Err(ReferralValidationError::SelfReferral)
        );
    }

    #[rstest]
    fn starts_uncredited() {
        let edge = ReferralEdge::new(UserId::random(), UserId::random(), Utc::now())
            .expect("valid edge");
        assert!(!edge.is_credited());
        assert!(edge.credited_at().is_none());
    }

    #[rstest]
    fn crediting_is_idempotent_and_keeps_first_timestamp() {
        let mut edge = ReferralEdge::new(UserId::random(), UserId::random(), Utc::now())
            .expect("valid edge");
        let first = Utc::now();
        let later = first + Duration::seconds(60);

        assert!(edge.mark_credited(first));
        assert!(!edge.mark_credited(later));
        assert_eq!(edge.credited_at(), Some(first));
    }
}
