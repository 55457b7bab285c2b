//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BadgeCatalogCommand, BadgeCatalogQuery, BalanceQuery, ChipLedgerCommand, LeaderboardQuery,
    ReferralCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Chip event writes.
    pub ledger: Arc<dyn ChipLedgerCommand>,
    /// Balance reads.
    pub balances: Arc<dyn BalanceQuery>,
    /// Ranked leaderboard reads.
    pub leaderboard: Arc<dyn LeaderboardQuery>,
    /// Badge catalog reads.
    pub badge_catalog: Arc<dyn BadgeCatalogQuery>,
    /// Admin-only badge catalog mutations.
    pub badge_admin: Arc<dyn BadgeCatalogCommand>,
    /// Referral attribution and crediting.
    pub referrals: Arc<dyn ReferralCommand>,
}
