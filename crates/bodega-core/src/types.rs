//! # Domain Types
//!
//! Core domain types used throughout Bodega POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Product      │   │     Variant      │   │   Transaction   │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)      │◄──┤  product_id (FK) │   │  id (UUID)      │      │
//! │  │  name           │   │  sku (business)  │   │  user_id        │      │
//! │  │  category       │   │  price_cents     │   │  total_cents    │      │
//! │  │  is_active      │   │  stock           │   │  payment_method │      │
//! │  └─────────────────┘   └──────────────────┘   └────────┬────────┘      │
//! │                                                        │               │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌────────▼────────┐      │
//! │  │    Profile      │   │     TaxRate      │   │ TransactionItem │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id = auth id   │   │  bps (u32)       │   │  variant_id     │      │
//! │  │  role           │   │  1600 = 16%      │   │  unit_price     │      │
//! │  │  full_name      │   └──────────────────┘   │  quantity       │      │
//! │  └─────────────────┘                          └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products and variants carry:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `sku` (variants): human-readable business identifier, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_MIN_STOCK;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1600 bps = 16% (the VAT rate this store operates under)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Role assigned to a profile; gates admin operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access: catalog, users, reports.
    Admin,
    /// Checkout only.
    Cashier,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Cashier
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Paid and finalized. Checkout writes this directly; only completed
    /// transactions count toward sales figures.
    Completed,
    /// Recorded but awaiting settlement.
    Pending,
    /// Cancelled/refunded.
    Cancelled,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Bank transfer.
    Transfer,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. Sellable units are its [`Variant`]s.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the catalog and on receipts.
    pub name: String,

    /// Optional long-form description.
    pub description: Option<String>,

    /// Category name used for catalog filtering.
    pub category: String,

    /// URL of the product image in external object storage.
    pub image_url: Option<String>,

    /// Whether the product is visible on the POS (soft availability).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Variant
// =============================================================================

/// A sellable unit of a product (size, flavor, pack count).
///
/// Stock lives here, not on the product: checkout decrements variant stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Variant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning product.
    pub product_id: String,

    /// Stock Keeping Unit - business identifier, unique store-wide.
    pub sku: String,

    /// Variant display name ("600ml", "12-pack").
    pub name: String,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Acquisition cost in cents (for margin reports).
    pub cost_cents: Option<i64>,

    /// Units on hand. Never negative; checkout uses a guarded decrement.
    pub stock: i64,

    /// Low-stock threshold. `None` means use [`DEFAULT_MIN_STOCK`].
    pub min_stock: Option<i64>,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Whether the variant is sellable.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the acquisition cost as Money, if recorded.
    #[inline]
    pub fn cost(&self) -> Option<Money> {
        self.cost_cents.map(Money::from_cents)
    }

    /// The low-stock threshold that applies to this variant.
    #[inline]
    pub fn effective_min_stock(&self) -> i64 {
        self.min_stock.unwrap_or(DEFAULT_MIN_STOCK)
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Local mirror of an externally-authenticated user.
///
/// The id matches the auth provider's user id; credentials never live here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    /// Auth provider user id (UUID).
    pub id: String,

    /// Role gating admin operations.
    pub role: UserRole,

    /// Display name.
    pub full_name: String,

    /// URL of an avatar image in external object storage.
    pub avatar_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Checks whether this profile may perform admin operations.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A recorded sale. Created once per checkout, immutable thereafter.
///
/// Totals are the figures the cart engine computed at confirmation time;
/// they are never re-derived from the item rows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Cashier who rang the sale (auth provider user id). Deliberately not
    /// a foreign key: profiles can be deleted without invalidating history.
    pub user_id: String,

    /// Sum of line totals before discount and tax.
    pub subtotal_cents: i64,

    /// Tax on the post-discount base.
    pub tax_cents: i64,

    /// Absolute discount applied to the subtotal.
    pub discount_cents: i64,

    /// Amount due: max(0, subtotal − discount + tax).
    pub total_cents: i64,

    pub payment_method: PaymentMethod,

    pub status: TransactionStatus,

    /// Free-form note from the cashier.
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the tax as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Returns the discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether this transaction counts toward sales figures.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item of a recorded sale.
/// Uses the snapshot pattern: unit price is frozen at time of sale, not the
/// live catalog price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning transaction.
    pub transaction_id: String,

    /// Variant that was sold.
    pub variant_id: String,

    /// Units sold.
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Line total: unit_price × quantity.
    pub subtotal_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1600);
        assert_eq!(rate.bps(), 1600);
        assert!((rate.percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(16.0);
        assert_eq!(rate.bps(), 1600);
    }

    #[test]
    fn test_tax_rate_default_is_vat() {
        assert_eq!(TaxRate::default().bps(), crate::DEFAULT_TAX_RATE_BPS);
    }

    #[test]
    fn test_role_default_is_cashier() {
        assert_eq!(UserRole::default(), UserRole::Cashier);
    }

    /// Enum wire shapes are the schema contract with the store: the TEXT
    /// columns hold exactly these strings.
    #[test]
    fn test_enum_wire_shapes() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cash).unwrap(),
            "\"cash\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Transfer).unwrap(),
            "\"transfer\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");

        let parsed: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Card);
    }

    #[test]
    fn test_effective_min_stock_fallback() {
        let mut variant = Variant {
            id: "v1".to_string(),
            product_id: "p1".to_string(),
            sku: "SKU-1".to_string(),
            name: "600ml".to_string(),
            price_cents: 1500,
            cost_cents: None,
            stock: 10,
            min_stock: None,
            barcode: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(variant.effective_min_stock(), crate::DEFAULT_MIN_STOCK);

        variant.min_stock = Some(12);
        assert_eq!(variant.effective_min_stock(), 12);
    }

    #[test]
    fn test_transaction_money_helpers() {
        let tx = Transaction {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            subtotal_cents: 25000,
            tax_cents: 4000,
            discount_cents: 0,
            total_cents: 29000,
            payment_method: PaymentMethod::Cash,
            status: TransactionStatus::Completed,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(tx.total(), Money::from_cents(29000));
        assert_eq!(tx.subtotal() - tx.discount() + tx.tax(), tx.total());
        assert!(tx.is_completed());
    }
}
