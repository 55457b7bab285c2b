//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and a `bb8` connection pool.
//!
//! Adapters convert between database rows and validated domain types; a row
//! that fails domain validation surfaces as a `Corrupt` repository error
//! rather than panicking or leaking half-formed entities.

mod diesel_badge_catalog_repository;
mod diesel_error_mapping;
mod diesel_ledger_repository;
mod diesel_projection_repository;
mod diesel_referral_repository;
mod diesel_user_badge_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_badge_catalog_repository::DieselBadgeCatalogRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_projection_repository::DieselProjectionRepository;
pub use diesel_referral_repository::DieselReferralRepository;
pub use diesel_user_badge_repository::DieselUserBadgeRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
