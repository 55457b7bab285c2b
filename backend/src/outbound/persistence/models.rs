//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    badge_definitions, balance_projections, ledger_entries, referral_edges, user_badges,
};

/// Row struct for reading from the ledger_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub seq: i64,
    pub entry_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: String,
    pub source_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Insertable struct for appending ledger entries; `seq` is assigned by the
/// database sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_entries)]
pub(crate) struct NewLedgerEntryRow {
    pub entry_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: String,
    pub source_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Row struct for the balance_projections table; doubles as the upsert
/// payload because every column is written on save.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = balance_projections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BalanceProjectionRow {
    pub user_id: Uuid,
    pub balance: i64,
    pub referral_count: i32,
    pub prompts_approved: i32,
    pub last_entry_seq: i64,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the badge_definitions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = badge_definitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BadgeDefinitionRow {
    pub badge_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub chips_reward: i32,
    pub unlock_rule: serde_json::Value,
    #[expect(dead_code, reason = "schema field used only for catalog ordering")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating badge definitions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = badge_definitions)]
pub(crate) struct NewBadgeDefinitionRow {
    pub badge_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub chips_reward: i32,
    pub unlock_rule: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for replacing a badge's fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = badge_definitions)]
pub(crate) struct BadgeDefinitionUpdate {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub chips_reward: i32,
    pub unlock_rule: serde_json::Value,
}

/// Row struct for the user_badges table; also the insert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_badges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserBadgeRow {
    pub user_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
}

/// Row struct for the referral_edges table; also the insert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = referral_edges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReferralEdgeRow {
    pub referee_id: Uuid,
    pub referrer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub credited_at: Option<DateTime<Utc>>,
}
