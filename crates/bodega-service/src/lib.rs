//! # bodega-service: Orchestration Layer for Bodega POS
//!
//! Service operations that connect the pure logic in `bodega-core` to the
//! SQLite store in `bodega-db`. This is where identity checks, validation,
//! the checkout saga, and report assembly live.
//!
//! ## Module Organization
//! ```text
//! bodega_service/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── identity.rs     ◄─── Caller identity handed in by the host app
//! ├── config.rs       ◄─── Store configuration (env + defaults)
//! ├── error.rs        ◄─── ServiceError / CheckoutError
//! ├── checkout.rs     ◄─── Cart snapshot → Transaction + items + stock
//! ├── catalog.rs      ◄─── Product/variant administration
//! ├── users.rs        ◄─── Profile administration (role gating)
//! └── dashboard.rs    ◄─── Stats, charts, reports
//! ```
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Who owns what                                      │
//! │                                                                         │
//! │  Host app (UI, auth)                                                    │
//! │     │  holds the Cart, passes Option<&Identity>                         │
//! │     ▼                                                                   │
//! │  bodega-service (THIS CRATE)                                            │
//! │     │  authorization, validation, orchestration, degradation            │
//! │     ▼                                                                   │
//! │  bodega-core          bodega-db                                         │
//! │  money/cart/reports   repositories over SQLite                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod users;

pub use catalog::{CatalogService, ProductInput, ProductWithVariants, VariantInput};
pub use checkout::{
    CheckoutOutcome, CheckoutRequest, CheckoutService, StockFailure, StockFailureReason,
};
pub use config::PosConfig;
pub use dashboard::{
    DashboardService, DashboardStats, LowStockItem, RecentTransaction, SalesReport,
};
pub use error::{CheckoutError, ServiceError, ServiceResult};
pub use identity::Identity;
pub use users::{ProfileChanges, UserService, UserStats};
