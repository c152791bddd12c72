//! Business logic services for the Kitchen Ledger backend

pub mod auth;
pub mod ledger;
pub mod recipe;
pub mod report;
pub mod sale;
pub mod stock;
pub mod waste;

pub use auth::AuthService;
pub use ledger::{LedgerService, OwnerLocks};
pub use recipe::RecipeService;
pub use report::ReportService;
pub use sale::SaleService;
pub use stock::StockService;
pub use waste::WasteService;
