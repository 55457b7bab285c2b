//! Port for referral attribution facts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;
use crate::domain::referral::ReferralEdge;

use super::define_port_error;

define_port_error! {
    /// Errors raised by referral repository adapters.
    pub enum ReferralRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "referral repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "referral repository query failed: {message}",
        /// A stored row failed domain validation on load.
        Corrupt { message: String } =>
            "referral repository returned a corrupt row: {message}",
    }
}

/// Result of an attribution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributionOutcome {
    /// The edge was recorded by this call.
    Recorded(ReferralEdge),
    /// The referee was already attributed; the existing edge wins.
    AlreadyAttributed(ReferralEdge),
}

impl AttributionOutcome {
    /// The recorded or pre-existing edge.
    pub fn edge(&self) -> &ReferralEdge {
        match self {
            Self::Recorded(edge) | Self::AlreadyAttributed(edge) => edge,
        }
    }

    /// Whether an earlier attribution absorbed this attempt.
    pub fn is_already_attributed(&self) -> bool {
        matches!(self, Self::AlreadyAttributed(_))
    }
}

/// Port for recording and crediting referral edges.
///
/// First attribution wins: a second attribution attempt for the same
/// referee returns the existing edge unchanged rather than erroring.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// Record an attribution unless the referee already has one.
    async fn attribute(
        &self,
        edge: ReferralEdge,
    ) -> Result<AttributionOutcome, ReferralRepositoryError>;

    /// Look up the edge for a referee.
    async fn find_by_referee(
        &self,
        referee_id: &UserId,
    ) -> Result<Option<ReferralEdge>, ReferralRepositoryError>;

    /// Mark the referee's edge credited at the given instant, keeping the
    /// first credit timestamp on repeat calls. Returns the up-to-date edge,
    /// or `None` when the referee has no attribution.
    async fn mark_credited(
        &self,
        referee_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ReferralEdge>, ReferralRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn outcome_exposes_edge_for_both_variants() {
        let edge = ReferralEdge::new(UserId::random(), UserId::random(), Utc::now())
            .expect("valid edge");
        let recorded = AttributionOutcome::Recorded(edge.clone());
        let existing = AttributionOutcome::AlreadyAttributed(edge.clone());

        assert_eq!(recorded.edge(), &edge);
        assert_eq!(existing.edge(), &edge);
        assert!(!recorded.is_already_attributed());
        assert!(existing.is_already_attributed());
    }
}
