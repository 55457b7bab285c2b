//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Append-only chip ledger.
    ///
    /// `seq` is a BIGSERIAL primary key providing the global append order.
    /// A partial unique index on `(user_id, reason, source_ref)` (where
    /// `source_ref` is not null) enforces trigger idempotency.
    ledger_entries (seq) {
        /// Global append sequence (BIGSERIAL).
        seq -> Int8,
        /// Unique entry identifier (UUID v4).
        entry_id -> Uuid,
        /// The credited or debited user.
        user_id -> Uuid,
        /// Signed chip delta; non-zero.
        amount -> Int8,
        /// Enumerated entry reason, stored as its wire name.
        reason -> Varchar,
        /// Identifier of the triggering object; null for admin adjustments.
        source_ref -> Nullable<Varchar>,
        /// When the entry became durable.
        created_at -> Timestamptz,
        /// The actor that caused the entry.
        created_by -> Uuid,
    }
}

diesel::table! {
    /// Derived per-user balance projections, owned by the projector.
    balance_projections (user_id) {
        /// Projected user (primary key).
        user_id -> Uuid,
        /// Sum of all folded entry amounts.
        balance -> Int8,
        /// Number of credited referrals folded in.
        referral_count -> Int4,
        /// Number of approved prompts folded in.
        prompts_approved -> Int4,
        /// Watermark of the last folded entry.
        last_entry_seq -> Int8,
        /// When the last folded entry was recorded.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Static badge catalog, edited only by admin actors.
    badge_definitions (badge_id) {
        /// Stable badge identifier (UUID v4).
        badge_id -> Uuid,
        /// Display name (max 64 characters).
        name -> Varchar,
        /// Longer catalog description.
        description -> Text,
        /// Icon identifier rendered by clients.
        icon -> Varchar,
        /// Chips credited when the badge unlocks.
        chips_reward -> Int4,
        /// Unlock predicate, stored as tagged JSON.
        unlock_rule -> Jsonb,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Earned-badge facts; composite primary key enforces at most one per
    /// `(user, badge)`.
    user_badges (user_id, badge_id) {
        /// The user who earned the badge.
        user_id -> Uuid,
        /// The earned badge.
        badge_id -> Uuid,
        /// When the badge was earned.
        earned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Referral attribution facts; the referee primary key enforces
    /// first-attribution-wins.
    referral_edges (referee_id) {
        /// The referred user (primary key).
        referee_id -> Uuid,
        /// The referring user.
        referrer_id -> Uuid,
        /// When the attribution was recorded.
        created_at -> Timestamptz,
        /// When the referral was credited; null until the qualifying action.
        credited_at -> Nullable<Timestamptz>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    ledger_entries,
    balance_projections,
    badge_definitions,
    user_badges,
    referral_edges,
);
