//! HTTP handlers for the Kitchen Ledger backend

pub mod auth;
pub mod health;
pub mod recipe;
pub mod report;
pub mod sale;
pub mod stock;
pub mod waste;

pub use auth::*;
pub use health::*;
pub use recipe::*;
pub use report::*;
pub use sale::*;
pub use stock::*;
pub use waste::*;
