//! Validation errors for ledger entry construction.

use thiserror::Error;

use super::reason::ChipReason;

/// Validation errors raised while constructing ledger entry types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerValidationError {
    /// A zero amount would record a no-op fact.
    #[error("chip amount must not be zero")]
    ZeroAmount,
    /// The reason requires a triggering object but none was named.
    #[error("reason {reason} requires a source reference")]
    MissingSourceRef {
        /// The reason that was missing its source reference.
        reason: ChipReason,
    },
    /// The source reference was blank or carried surrounding whitespace.
    #[error("source reference must be a non-empty trimmed string")]
    EmptySourceRef,
    /// The source reference exceeded the length cap.
    #[error("source reference must be at most {max} bytes")]
    SourceRefTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}
