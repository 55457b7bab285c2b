//! PostgreSQL-backed `LedgerRepository` implementation using Diesel ORM.
//!
//! Idempotency rides on the partial unique index over
//! `(user_id, reason, source_ref)`: an insert that violates it is answered
//! by re-selecting the existing row, so retried triggers observe the
//! original entry instead of an error.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ledger::{
    ChipReason, EntrySeq, LedgerEntry, LedgerEntryRecord, NewLedgerEntry,
};
use crate::domain::ports::{AppendOutcome, LedgerRepository, LedgerRepositoryError};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{LedgerEntryRow, NewLedgerEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::ledger_entries;

/// Diesel-backed implementation of the ledger store port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool and clock.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool(error: PoolError) -> LedgerRepositoryError {
    map_pool_error(error, LedgerRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> LedgerRepositoryError {
    map_diesel_error(
        error,
        LedgerRepositoryError::query,
        LedgerRepositoryError::connection,
    )
}

fn seq_from_row(seq: i64) -> Result<EntrySeq, LedgerRepositoryError> {
    u64::try_from(seq)
        .map(EntrySeq::new)
        .map_err(|_| LedgerRepositoryError::corrupt(format!("negative sequence {seq}")))
}

/// Convert a database row into a validated domain ledger entry.
fn row_to_entry(row: LedgerEntryRow) -> Result<LedgerEntry, LedgerRepositoryError> {
    let LedgerEntryRow {
        seq,
        entry_id,
        user_id,
        amount,
        reason,
        source_ref,
        created_at,
        created_by,
    } = row;

    let reason = ChipReason::from_str(&reason)
        .map_err(|_| LedgerRepositoryError::corrupt(format!("unknown reason {reason}")))?;
    LedgerEntry::try_from(LedgerEntryRecord {
        entry_id,
        seq: seq_from_row(seq)?,
        user_id: UserId::from_uuid(user_id),
        amount,
        reason,
        source_ref,
        created_at,
        created_by: UserId::from_uuid(created_by),
    })
    .map_err(|err| LedgerRepositoryError::corrupt(err.to_string()))
}

fn insert_row(entry: &NewLedgerEntry, created_at: chrono::DateTime<chrono::Utc>) -> NewLedgerEntryRow {
    NewLedgerEntryRow {
        entry_id: Uuid::new_v4(),
        user_id: *entry.user_id().as_uuid(),
        amount: entry.amount().get(),
        reason: entry.reason().to_string(),
        source_ref: entry.source_ref().map(|s| s.as_str().to_owned()),
        created_at,
        created_by: *entry.created_by().as_uuid(),
    }
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn append(&self, entry: NewLedgerEntry) -> Result<AppendOutcome, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = insert_row(&entry, self.clock.utc());

        let inserted = diesel::insert_into(ledger_entries::table)
            .values(&row)
            .returning(LedgerEntryRow::as_returning())
            .get_result::<LedgerEntryRow>(&mut conn)
            .await;

        match inserted {
            Ok(stored) => row_to_entry(stored).map(AppendOutcome::Recorded),
            Err(error) if is_unique_violation(&error) => {
                let Some(source_ref) = entry.source_ref() else {
                    // Entries without a source ref are outside the unique
                    // index; a violation here means the schema drifted.
                    return Err(map_diesel(error));
                };
                let existing = ledger_entries::table
                    .filter(ledger_entries::user_id.eq(entry.user_id().as_uuid()))
                    .filter(ledger_entries::reason.eq(entry.reason().to_string()))
                    .filter(ledger_entries::source_ref.eq(source_ref.as_str()))
                    .select(LedgerEntryRow::as_select())
                    .first::<LedgerEntryRow>(&mut conn)
                    .await
                    .map_err(map_diesel)?;
                row_to_entry(existing).map(AppendOutcome::Duplicate)
            }
            Err(error) => Err(map_diesel(error)),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        since: Option<EntrySeq>,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let watermark = i64::try_from(since.unwrap_or(EntrySeq::ORIGIN).value())
            .map_err(|_| LedgerRepositoryError::query("watermark exceeds storage range"))?;

        let rows = ledger_entries::table
            .filter(ledger_entries::user_id.eq(user_id.as_uuid()))
            .filter(ledger_entries::seq.gt(watermark))
            .order(ledger_entries::seq.asc())
            .select(LedgerEntryRow::as_select())
            .load::<LedgerEntryRow>(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; behaviour against a live database is
    //! exercised by integration environments with `DATABASE_URL` set.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn sample_row() -> LedgerEntryRow {
        LedgerEntryRow {
            seq: 7,
            entry_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: 100,
            reason: "prompt_approved".to_owned(),
            source_ref: Some("prompt-42".to_owned()),
            created_at: Utc::now(),
            created_by: Uuid::new_v4(),
        }
    }

    #[rstest]
    fn row_round_trips_into_a_domain_entry() {
        let row = sample_row();
        let entry = row_to_entry(row.clone()).expect("valid row");

        assert_eq!(entry.seq(), EntrySeq::new(7));
        assert_eq!(entry.amount().get(), 100);
        assert_eq!(entry.reason(), ChipReason::PromptApproved);
        assert_eq!(entry.entry_id(), row.entry_id);
    }

    #[rstest]
    fn unknown_reasons_surface_as_corrupt_rows() {
        let mut row = sample_row();
        row.reason = "bribery".to_owned();
        let error = row_to_entry(row).expect_err("corrupt row");
        assert!(matches!(error, LedgerRepositoryError::Corrupt { .. }));
    }

    #[rstest]
    fn zero_amount_rows_surface_as_corrupt() {
        let mut row = sample_row();
        row.amount = 0;
        let error = row_to_entry(row).expect_err("corrupt row");
        assert!(matches!(error, LedgerRepositoryError::Corrupt { .. }));
    }

    #[rstest]
    fn negative_sequences_surface_as_corrupt() {
        let mut row = sample_row();
        row.seq = -1;
        let error = row_to_entry(row).expect_err("corrupt row");
        assert!(matches!(error, LedgerRepositoryError::Corrupt { .. }));
    }
}
