//! In-process adapters for the persistence ports.
//!
//! These back single-instance deployments (no `DATABASE_URL`) and the
//! integration tests. They honour the same contracts as the PostgreSQL
//! adapters: idempotent appends, first-attribution-wins referrals, and
//! `(user, badge)` uniqueness — so tests against them exercise the real
//! service semantics.

mod badges;
mod ledger;
mod projections;
mod referrals;

pub use badges::{InMemoryBadgeCatalogRepository, InMemoryUserBadgeRepository};
pub use ledger::InMemoryLedgerRepository;
pub use projections::InMemoryProjectionRepository;
pub use referrals::InMemoryReferralRepository;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering from poisoning.
///
/// A panic while holding one of these locks can only leave fully written
/// values behind (every critical section is a single insert or read), so
/// recovering the guard is safe.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
