//! # Repository Module
//!
//! Database repository implementations for Bodega POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service operation                                                     │
//! │       │                                                                 │
//! │       │  db.products().variants_for_product(id)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, filter)                                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── decrement_stock(&self, variant_id, qty)                           │
//! │       │                                                                 │
//! │       │  SQL Query (runtime-checked, bound parameters)                  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Join row shapes live next to the queries that produce them          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product/variant CRUD, stock mutation
//! - [`transaction::TransactionRepository`] - Sales records and report rows
//! - [`profile::ProfileRepository`] - User profile administration

pub mod product;
pub mod profile;
pub mod transaction;
