//! Domain model and services for the chip rewards ledger.
//!
//! Purpose: define the strongly typed entities (ledger entries, projections,
//! badges, referrals, leaderboard rows), the ports at the hexagon's edge,
//! and the services that implement the append → project → evaluate unit.
//! Types here are transport- and storage-agnostic; adapters live under
//! `inbound` and `outbound`.

pub mod badge;
pub mod badge_admin_service;
pub mod badge_engine;
pub mod error;
pub mod leaderboard;
pub mod leaderboard_service;
pub mod ledger;
pub mod ledger_service;
pub mod ports;
pub mod projection;
pub mod referral;
pub mod referral_service;
mod trace_id;
pub mod user;

pub use self::badge::{
    BADGE_NAME_MAX, BadgeDefinition, BadgeDefinitionDraft, BadgeValidationError, UnlockRule,
    UserBadge,
};
pub use self::badge_admin_service::BadgeAdminService;
pub use self::badge_engine::BadgeRuleEngine;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::leaderboard::{LeaderboardEntry, LeaderboardSnapshot};
pub use self::leaderboard_service::{DEFAULT_STALENESS, LeaderboardService};
pub use self::ledger::{
    ChipAmount, ChipReason, EntrySeq, LedgerEntry, LedgerEntryRecord, LedgerValidationError,
    NewLedgerEntry, ParseChipReasonError, SourceRef,
};
pub use self::ledger_service::ChipLedgerService;
pub use self::projection::{BalanceProjection, ParseTierError, Tier};
pub use self::referral::{ReferralEdge, ReferralValidationError};
pub use self::referral_service::{REFERRAL_CREDIT_CHIPS, ReferralService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Actor, ActorRole, ParseActorRoleError, UserId, UserValidationError};
