//! # bodega-core: Pure Business Logic for Bodega POS
//!
//! This crate is the **heart** of Bodega POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bodega POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (out of scope)                      │   │
//! │  │    POS screen ──► Cart sidebar ──► Payment ──► Admin dashboard │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bodega-service                               │   │
//! │  │    checkout, catalog admin, user admin, dashboard reads         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bodega-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ reports │ │validation│ │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │ periods │ │  rules  │ │   │
//! │  │   │ Variant │ │ TaxCalc │ │CartItem │ │ top-N   │ │ checks  │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bodega-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Variant, Transaction, Profile, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart engine: line items plus derived totals
//! - [`reports`] - Aggregation math for the admin dashboard and reports
//! - [`error`] - Validation error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Injected Clocks**: Report math takes "now" as a parameter, never samples it
//!
//! ## Example Usage
//!
//! ```rust
//! use bodega_core::money::Money;
//! use bodega_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(2500); // $25.00
//!
//! // VAT at the default 16% rate
//! let tax_rate = TaxRate::from_bps(bodega_core::DEFAULT_TAX_RATE_BPS);
//! let tax = price.calculate_tax(tax_rate);
//!
//! assert_eq!(tax.cents(), 400); // $4.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod reports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bodega_core::Money` instead of
// `use bodega_core::money::Money`

pub use cart::{Cart, CartItem, CartTotals};
pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default sales tax rate in basis points (1600 = 16%, VAT).
///
/// ## Why a constant?
/// The store operates in a single jurisdiction with a fixed 16% rate.
/// Carts accept an explicit [`types::TaxRate`] so a different rate can be
/// injected without touching the engine.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1600;

/// Stock threshold used when a variant does not define `min_stock`.
///
/// A variant counts as low-stock when `stock <= min_stock.unwrap_or(5)`.
pub const DEFAULT_MIN_STOCK: i64 = 5;
