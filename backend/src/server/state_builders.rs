//! Builders wiring repositories and services into the HTTP state.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;

use backend::domain::ports::AllowAllUserDirectory;
use backend::domain::{
    BadgeAdminService, BadgeRuleEngine, ChipLedgerService, LeaderboardService, ReferralService,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::{
    InMemoryBadgeCatalogRepository, InMemoryLedgerRepository, InMemoryProjectionRepository,
    InMemoryReferralRepository, InMemoryUserBadgeRepository,
};
use backend::outbound::persistence::{
    DbPool, DieselBadgeCatalogRepository, DieselLedgerRepository, DieselProjectionRepository,
    DieselReferralRepository, DieselUserBadgeRepository,
};

use super::ServerConfig;

/// Build the HTTP state from configuration: PostgreSQL-backed when a pool is
/// available, in-process otherwise.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => build_diesel_state(pool.clone(), config.leaderboard_staleness),
        None => build_memory_state(config.leaderboard_staleness),
    }
}

fn build_diesel_state(pool: DbPool, staleness: Duration) -> HttpState {
    let clock = Arc::new(DefaultClock);

    let ledger_repo = Arc::new(DieselLedgerRepository::new(pool.clone(), clock.clone()));
    let projection_repo = Arc::new(DieselProjectionRepository::new(pool.clone()));
    let catalog_repo = Arc::new(DieselBadgeCatalogRepository::new(pool.clone(), clock.clone()));
    let user_badge_repo = Arc::new(DieselUserBadgeRepository::new(pool.clone()));
    let referral_repo = Arc::new(DieselReferralRepository::new(pool));

    let engine = BadgeRuleEngine::new(catalog_repo.clone(), user_badge_repo);
    let ledger = Arc::new(ChipLedgerService::new(
        ledger_repo,
        projection_repo.clone(),
        engine,
        Arc::new(AllowAllUserDirectory),
        clock.clone(),
    ));
    let leaderboard = Arc::new(LeaderboardService::new(
        projection_repo,
        clock.clone(),
        staleness,
    ));
    let referrals = Arc::new(ReferralService::new(referral_repo, ledger.clone(), clock));
    let badge_admin = Arc::new(BadgeAdminService::new(catalog_repo));

    HttpState {
        balances: ledger.clone(),
        ledger,
        leaderboard,
        badge_catalog: badge_admin.clone(),
        badge_admin,
        referrals,
    }
}

fn build_memory_state(staleness: Duration) -> HttpState {
    let clock = Arc::new(DefaultClock);

    let ledger_repo = Arc::new(InMemoryLedgerRepository::new(clock.clone()));
    let projection_repo = Arc::new(InMemoryProjectionRepository::new());
    let catalog_repo = Arc::new(InMemoryBadgeCatalogRepository::new());
    let user_badge_repo = Arc::new(InMemoryUserBadgeRepository::new());
    let referral_repo = Arc::new(InMemoryReferralRepository::new());

    let engine = BadgeRuleEngine::new(catalog_repo.clone(), user_badge_repo);
    let ledger = Arc::new(ChipLedgerService::new(
        ledger_repo,
        projection_repo.clone(),
        engine,
        Arc::new(AllowAllUserDirectory),
        clock.clone(),
    ));
    let leaderboard = Arc::new(LeaderboardService::new(
        projection_repo,
        clock.clone(),
        staleness,
    ));
    let referrals = Arc::new(ReferralService::new(referral_repo, ledger.clone(), clock));
    let badge_admin = Arc::new(BadgeAdminService::new(catalog_repo));

    HttpState {
        balances: ledger.clone(),
        ledger,
        leaderboard,
        badge_catalog: badge_admin.clone(),
        badge_admin,
        referrals,
    }
}
