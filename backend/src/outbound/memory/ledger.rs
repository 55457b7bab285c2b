//! In-process ledger store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ledger::{EntrySeq, LedgerEntry, NewLedgerEntry};
use crate::domain::ports::{AppendOutcome, LedgerRepository, LedgerRepositoryError};
use crate::domain::UserId;

use super::lock_unpoisoned;

struct LedgerState {
    entries: Vec<LedgerEntry>,
    next_seq: u64,
}

/// In-process [`LedgerRepository`] with the same idempotency contract as the
/// PostgreSQL adapter.
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLedgerRepository {
    /// Create an empty ledger stamping entries with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                entries: Vec::new(),
                next_seq: 0,
            }),
            clock,
        }
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn append(&self, entry: NewLedgerEntry) -> Result<AppendOutcome, LedgerRepositoryError> {
        let mut state = lock_unpoisoned(&self.state);

        // NULL source refs never collide, matching the SQL unique index:
        // admin adjustments are repeatable by design.
        if entry.source_ref().is_some() {
            if let Some(existing) = state.entries.iter().find(|candidate| {
                candidate.user_id() == entry.user_id()
                    && candidate.reason() == entry.reason()
                    && candidate.source_ref() == entry.source_ref()
            }) {
                return Ok(AppendOutcome::Duplicate(existing.clone()));
            }
        }

        state.next_seq += 1;
        let sealed = LedgerEntry::record(
            entry,
            Uuid::new_v4(),
            EntrySeq::new(state.next_seq),
            self.clock.utc(),
        );
        state.entries.push(sealed.clone());
        Ok(AppendOutcome::Recorded(sealed))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        since: Option<EntrySeq>,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError> {
        let state = lock_unpoisoned(&self.state);
        let watermark = since.unwrap_or(EntrySeq::ORIGIN);
        Ok(state
            .entries
            .iter()
            .filter(|entry| entry.user_id() == user_id && entry.seq() > watermark)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use mockable::DefaultClock;
    use rstest::rstest;

    use super::*;
    use crate::domain::ledger::{ChipAmount, ChipReason, SourceRef};

    fn repo() -> InMemoryLedgerRepository {
        InMemoryLedgerRepository::new(Arc::new(DefaultClock))
    }

    fn new_entry(user: &UserId, amount: i64, source_ref: &str) -> NewLedgerEntry {
        NewLedgerEntry::new(
            user.clone(),
            ChipAmount::new(amount).expect("non-zero amount"),
            ChipReason::PromptApproved,
            Some(SourceRef::new(source_ref).expect("valid source ref")),
            user.clone(),
        )
        .expect("valid entry")
    }

    #[rstest]
    #[tokio::test]
    async fn assigns_increasing_sequences() {
        let ledger = repo();
        let user = UserId::random();

        let first = ledger.append(new_entry(&user, 100, "prompt-1")).await.expect("append");
        let second = ledger.append(new_entry(&user, 200, "prompt-2")).await.expect("append");

        assert!(first.entry().seq() < second.entry().seq());
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_source_ref_returns_the_original_entry() {
        let ledger = repo();
        let user = UserId::random();

        let first = ledger.append(new_entry(&user, 100, "prompt-1")).await.expect("append");
        let retry = ledger.append(new_entry(&user, 100, "prompt-1")).await.expect("append");

        assert!(retry.is_duplicate());
        assert_eq!(retry.entry().entry_id(), first.entry().entry_id());

        let entries = ledger.list_for_user(&user, None).await.expect("list");
        assert_eq!(entries.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn admin_adjustments_without_source_ref_never_collide() {
        let ledger = repo();
        let user = UserId::random();
        let adjustment = || {
            NewLedgerEntry::new(
                user.clone(),
                ChipAmount::new(-10).expect("non-zero amount"),
                ChipReason::AdminAdjustment,
                None,
                user.clone(),
            )
            .expect("valid entry")
        };

        let first = ledger.append(adjustment()).await.expect("append");
        let second = ledger.append(adjustment()).await.expect("append");

        assert!(!first.is_duplicate());
        assert!(!second.is_duplicate());
    }

    #[rstest]
    #[tokio::test]
    async fn list_honours_the_since_watermark() {
        let ledger = repo();
        let user = UserId::random();

        let first = ledger.append(new_entry(&user, 100, "prompt-1")).await.expect("append");
        ledger.append(new_entry(&user, 200, "prompt-2")).await.expect("append");

        let after_first = ledger
            .list_for_user(&user, Some(first.entry().seq()))
            .await
            .expect("list");
        assert_eq!(after_first.len(), 1);
        assert_eq!(after_first.first().map(|e| e.amount().get()), Some(200));
    }

    #[rstest]
    #[tokio::test]
    async fn other_users_entries_are_invisible() {
        let ledger = repo();
        let user = UserId::random();
        ledger.append(new_entry(&user, 100, "prompt-1")).await.expect("append");

        let entries = ledger
            .list_for_user(&UserId::random(), None)
            .await
            .expect("list");
        assert!(entries.is_empty());
    }
}
