//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns,
//! currently request-scoped trace identifiers.

pub mod trace;

pub use trace::Trace;
