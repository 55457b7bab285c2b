//! Port for the append-only chip ledger store.

use async_trait::async_trait;

use crate::domain::ledger::{EntrySeq, LedgerEntry, NewLedgerEntry};
use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum LedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "ledger repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "ledger repository query failed: {message}",
        /// A stored row failed domain validation on load.
        Corrupt { message: String } =>
            "ledger repository returned a corrupt row: {message}",
        /// A concurrent writer raced this append; safe to retry.
        Conflict { message: String } =>
            "ledger append raced a concurrent writer: {message}",
    }
}

/// Result of an idempotent append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The entry was durably recorded by this call.
    Recorded(LedgerEntry),
    /// An entry with the same `(user, reason, source ref)` already existed;
    /// the original is returned unchanged.
    Duplicate(LedgerEntry),
}

impl AppendOutcome {
    /// The recorded or pre-existing entry.
    pub fn entry(&self) -> &LedgerEntry {
        match self {
            Self::Recorded(entry) | Self::Duplicate(entry) => entry,
        }
    }

    /// Whether the append was absorbed by an earlier identical trigger.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Port for appending and reading ledger entries.
///
/// Appends are idempotent on `(user, reason, source ref)`: a collision
/// returns the existing entry as [`AppendOutcome::Duplicate`], never an
/// error, so callers retrying a network failure cannot double-credit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Durably append a validated entry, assigning identity and sequence.
    async fn append(&self, entry: NewLedgerEntry) -> Result<AppendOutcome, LedgerRepositoryError>;

    /// Read a user's entries in ascending sequence order, optionally only
    /// those strictly after `since`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        since: Option<EntrySeq>,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ledger::{ChipAmount, ChipReason, SourceRef};

    fn sample_entry() -> LedgerEntry {
        let user = UserId::random();
        let request = NewLedgerEntry::new(
            user.clone(),
            ChipAmount::new(100).expect("non-zero amount"),
            ChipReason::ProfileCompletion,
            Some(SourceRef::new("profile").expect("valid source ref")),
            user,
        )
        .expect("valid request");
        LedgerEntry::record(request, Uuid::new_v4(), EntrySeq::new(1), Utc::now())
    }

    #[rstest]
    fn outcome_exposes_entry_for_both_variants() {
        let entry = sample_entry();
        let recorded = AppendOutcome::Recorded(entry.clone());
        let duplicate = AppendOutcome::Duplicate(entry.clone());

        assert_eq!(recorded.entry(), &entry);
        assert_eq!(duplicate.entry(), &entry);
        assert!(!recorded.is_duplicate());
        assert!(duplicate.is_duplicate());
    }

    #[rstest]
    fn conflict_error_formats_message() {
        let err = LedgerRepositoryError::conflict("sequence raced");
        assert!(err.to_string().contains("sequence raced"));
    }
}
