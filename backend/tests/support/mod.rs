//! Shared fixtures for integration tests: a full service stack over the
//! in-process repositories.
//!
//! Integration tests compile as separate crates under `backend/tests/`, which
//! is why the stack builder lives here rather than in the library.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use uuid::Uuid;

use backend::domain::badge::{BadgeDefinition, BadgeDefinitionDraft, UnlockRule};
use backend::domain::ports::AllowAllUserDirectory;
use backend::domain::{
    BadgeAdminService, BadgeRuleEngine, ChipLedgerService, LeaderboardService, ReferralService,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::{
    InMemoryBadgeCatalogRepository, InMemoryLedgerRepository, InMemoryProjectionRepository,
    InMemoryReferralRepository, InMemoryUserBadgeRepository,
};

/// Concrete service stack over the in-process repositories.
pub type MemoryLedgerService = ChipLedgerService<
    InMemoryLedgerRepository,
    InMemoryProjectionRepository,
    InMemoryBadgeCatalogRepository,
    InMemoryUserBadgeRepository,
    AllowAllUserDirectory,
>;

/// Assembled fixture exposing the services and the repositories behind them.
pub struct Stack {
    pub ledger: Arc<MemoryLedgerService>,
    pub leaderboard: Arc<LeaderboardService<InMemoryProjectionRepository>>,
    pub referrals: Arc<ReferralService<InMemoryReferralRepository, MemoryLedgerService>>,
    pub badge_admin: Arc<BadgeAdminService<InMemoryBadgeCatalogRepository>>,
    pub user_badges: Arc<InMemoryUserBadgeRepository>,
}

/// Build a full stack seeded with the given badge catalog.
///
/// The leaderboard staleness window is zero so every read observes the
/// latest projections, which keeps assertions deterministic.
pub fn stack_with_badges(badges: Vec<BadgeDefinition>) -> Stack {
    let clock = Arc::new(DefaultClock);

    let ledger_repo = Arc::new(InMemoryLedgerRepository::new(clock.clone()));
    let projection_repo = Arc::new(InMemoryProjectionRepository::new());
    let catalog_repo = Arc::new(InMemoryBadgeCatalogRepository::with_badges(badges));
    let user_badges = Arc::new(InMemoryUserBadgeRepository::new());
    let referral_repo = Arc::new(InMemoryReferralRepository::new());

    let engine = BadgeRuleEngine::new(catalog_repo.clone(), user_badges.clone());
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
        Duration::ZERO,
    ));
    let referrals = Arc::new(ReferralService::new(referral_repo, ledger.clone(), clock));
    let badge_admin = Arc::new(BadgeAdminService::new(catalog_repo));

    Stack {
        ledger,
        leaderboard,
        referrals,
        badge_admin,
        user_badges,
    }
}

/// Build a stack with an empty badge catalog.
pub fn stack() -> Stack {
    stack_with_badges(Vec::new())
}

/// HTTP state over a built stack.
pub fn http_state(stack: &Stack) -> HttpState {
    HttpState {
        ledger: stack.ledger.clone(),
        balances: stack.ledger.clone(),
        leaderboard: stack.leaderboard.clone(),
        badge_catalog: stack.badge_admin.clone(),
        badge_admin: stack.badge_admin.clone(),
        referrals: stack.referrals.clone(),
    }
}

/// Catalog badge rewarding chips once a balance threshold is reached.
pub fn balance_badge(name: &str, threshold: i64, chips_reward: u32) -> BadgeDefinition {
    BadgeDefinition::new(BadgeDefinitionDraft {
        badge_id: Uuid::new_v4(),
        name: name.to_owned(),
        description: format!("{name} unlocks at balance {threshold}"),
        icon: "trophy".to_owned(),
        chips_reward,
        unlock_rule: UnlockRule::BalanceAtLeast { threshold },
    })
    .expect("valid badge fixture")
}

/// Catalog badge unlocking on credited referral count.
pub fn referral_badge(name: &str, threshold: u32, chips_reward: u32) -> BadgeDefinition {
    BadgeDefinition::new(BadgeDefinitionDraft {
        badge_id: Uuid::new_v4(),
        name: name.to_owned(),
        description: format!("{name} unlocks at {threshold} referrals"),
        icon: "people".to_owned(),
        chips_reward,
        unlock_rule: UnlockRule::ReferralCountAtLeast { threshold },
    })
    .expect("valid badge fixture")
}
