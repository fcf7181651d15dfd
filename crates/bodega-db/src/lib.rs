//! # bodega-db: Storage Layer for Bodega POS
//!
//! This crate provides database access for the Bodega POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bodega POS Data Flow                             │
//! │                                                                         │
//! │  Service operation (checkout, dashboard, catalog admin)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bodega-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (repository/)  │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ TransactionRepo│    │ ...          │  │   │
//! │  │   │ Management    │    │ ProfileRepo    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                      SQLite Database (WAL)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, transaction, profile)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("path/to/bodega.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let products = db.products().list_active().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::{LowStockRow, ProductFilter, ProductRepository, StatusFilter};
pub use repository::profile::ProfileRepository;
pub use repository::transaction::{
    ProductSaleRow, RecentTransactionRow, TransactionRepository, UserSalesTotals,
};
