//! Database models for the Kitchen Ledger backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
