//! Shared types and pure domain logic for the Kitchen Ledger platform
//!
//! This crate contains everything that can be computed without touching
//! the store: the transaction model, the inventory valuation engine, the
//! recipe cost calculator, cascade planning, report aggregation and
//! authoring-time validation. The backend provides the I/O around it.

pub mod cascade;
pub mod costing;
pub mod models;
pub mod reporting;
pub mod types;
pub mod validation;
pub mod valuation;

pub use models::*;
pub use types::*;
