//! HTTP middleware for the Kitchen Ledger backend

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
