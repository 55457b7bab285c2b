//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (databases, the identity directory) and what use-cases it drives for
//! inbound adapters. Each trait exposes strongly typed errors so adapters
//! map their failures into predictable variants instead of returning
//! `anyhow::Result`.

mod macros;
pub(crate) use macros::define_port_error;

mod badge_catalog_command;
mod badge_catalog_repository;
mod balance_query;
mod ledger_command;
mod ledger_repository;
mod leaderboard_query;
mod projection_repository;
mod referral_command;
mod referral_repository;
mod user_badge_repository;
mod user_directory;

#[cfg(test)]
pub use badge_catalog_command::{MockBadgeCatalogCommand, MockBadgeCatalogQuery};
pub use badge_catalog_command::{
    BadgeCatalogCommand, BadgeCatalogQuery, BadgeFields, CreateBadgeRequest, DeleteBadgeRequest,
    UpdateBadgeRequest,
};
#[cfg(test)]
pub use badge_catalog_repository::MockBadgeCatalogRepository;
pub use badge_catalog_repository::{BadgeCatalogRepository, BadgeCatalogRepositoryError};
#[cfg(test)]
pub use balance_query::MockBalanceQuery;
pub use balance_query::{BalancePayload, BalanceQuery};
#[cfg(test)]
pub use ledger_command::MockChipLedgerCommand;
pub use ledger_command::{
    ChipLedgerCommand, RecordChipEventRequest, RecordChipEventResponse, UnlockedBadgePayload,
};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{AppendOutcome, LedgerRepository, LedgerRepositoryError};
#[cfg(test)]
pub use leaderboard_query::MockLeaderboardQuery;
pub use leaderboard_query::{LeaderboardQuery, RankPayload};
#[cfg(test)]
pub use projection_repository::MockProjectionRepository;
pub use projection_repository::{ProjectionRepository, ProjectionRepositoryError};
#[cfg(test)]
pub use referral_command::MockReferralCommand;
pub use referral_command::{
    AttributeReferralRequest, AttributeReferralResponse, CompleteReferralRequest,
    CompleteReferralResponse, ReferralCommand,
};
#[cfg(test)]
pub use referral_repository::MockReferralRepository;
pub use referral_repository::{AttributionOutcome, ReferralRepository, ReferralRepositoryError};
#[cfg(test)]
pub use user_badge_repository::MockUserBadgeRepository;
pub use user_badge_repository::{UserBadgeRepository, UserBadgeRepositoryError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{AllowAllUserDirectory, UserDirectory, UserDirectoryError};
