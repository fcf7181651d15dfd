//! # Cart Engine
//!
//! The working sale basket and its derived monetary totals.
//!
//! ## Design Notes
//! The cart is an owned value, one per active session. It is NOT a global:
//! callers hold it (and wrap it in their own synchronization if their UI
//! framework needs that). Every operation is **total** - it always produces
//! a valid next state, and unknown variant ids are silent no-ops. That keeps
//! the engine free of failure paths; stock limits and discount clamping are
//! the caller's concern.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Engine Operations                            │
//! │                                                                         │
//! │  Cashier Action            Operation               State Change         │
//! │  ──────────────            ─────────               ────────────         │
//! │                                                                         │
//! │  Tap product ────────────► add_item() ───────────► qty += 1 or push    │
//! │                                                                         │
//! │  Edit quantity ──────────► update_quantity() ────► qty = n (≤0 drops)  │
//! │                                                                         │
//! │  Tap remove ─────────────► remove_item() ────────► retain others       │
//! │                                                                         │
//! │  Enter discount ─────────► set_discount() ───────► discount = amount   │
//! │                                                                         │
//! │  Void / checkout done ───► clear() ──────────────► items=[], disc=0    │
//! │                                                                         │
//! │  Totals are derived from current state on every read - there is no      │
//! │  cached figure to drift out of sync.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Derivation
//! ```text
//! subtotal   = Σ(item.price × item.quantity)
//! discounted = subtotal − discount          (discount applied BEFORE tax)
//! tax        = discounted × tax_rate
//! total      = max(0, discounted + tax)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, TaxRate, Variant};

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart: a variant snapshot plus quantity and the parent
/// product's display fields.
///
/// ## Price Freezing
/// The variant is copied at add time. If the catalog price changes while
/// the cart is open, this line keeps the price the cashier quoted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Variant snapshot frozen at add time (price, sku, stock, ...).
    pub variant: Variant,

    /// Units of this variant in the cart. Always ≥ 1.
    pub quantity: i64,

    /// Parent product name, denormalized for display and receipts.
    pub product_name: String,

    /// Parent product image, denormalized for display.
    pub product_image: Option<String>,
}

impl CartItem {
    /// Builds a line from a variant and its parent product.
    pub fn from_variant(variant: &Variant, product: &Product) -> Self {
        CartItem {
            variant: variant.clone(),
            quantity: 1,
            product_name: product.name.clone(),
            product_image: product.image_url.clone(),
        }
    }

    /// The frozen unit price.
    #[inline]
    pub fn unit_price(&self) -> Money {
        self.variant.price()
    }

    /// Line total: unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.variant.price() * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart for one session.
///
/// ## Invariants
/// - Lines are unique by variant id (adding the same variant bumps quantity)
/// - Line quantity is always ≥ 1 (an update to ≤ 0 removes the line)
/// - Insertion order is preserved (the receipt lists items as rung up)
/// - The engine never rejects an operation; it has no failure states
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    /// Lines in insertion order.
    pub items: Vec<CartItem>,

    /// Absolute discount on the subtotal. Callers clamp to the subtotal
    /// before passing it in; the engine stores what it is given.
    pub discount: Money,

    /// Tax rate applied to the post-discount base.
    pub tax_rate: TaxRate,
}

impl Cart {
    /// Creates an empty cart at the default tax rate.
    pub fn new() -> Self {
        Cart::with_tax_rate(TaxRate::default())
    }

    /// Creates an empty cart with an explicit tax rate.
    pub fn with_tax_rate(tax_rate: TaxRate) -> Self {
        Cart {
            items: Vec::new(),
            discount: Money::zero(),
            tax_rate,
        }
    }

    /// Adds one unit of a variant.
    ///
    /// If the variant is already in the cart its quantity goes up by one;
    /// otherwise a new line is appended with the variant and product fields
    /// snapshotted now. No stock check happens here.
    pub fn add_item(&mut self, variant: &Variant, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.variant.id == variant.id) {
            item.quantity += 1;
            return;
        }

        self.items.push(CartItem::from_variant(variant, product));
    }

    /// Removes the line for a variant. Unknown ids are a no-op.
    pub fn remove_item(&mut self, variant_id: &str) {
        self.items.retain(|i| i.variant.id != variant_id);
    }

    /// Sets the quantity of a line to an absolute value.
    ///
    /// A quantity of zero or below removes the line. Unknown ids are a
    /// no-op.
    pub fn update_quantity(&mut self, variant_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(variant_id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.variant.id == variant_id) {
            item.quantity = quantity;
        }
    }

    /// Sets the discount amount verbatim.
    ///
    /// Callers clamp to `min(amount, subtotal)` first - the engine does not
    /// enforce the clamp, only the final non-negative total.
    pub fn set_discount(&mut self, amount: Money) {
        self.discount = amount;
    }

    /// Resets to the empty initial state. The tax rate is retained.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = Money::zero();
    }

    /// Quantity of a variant currently in the cart (0 if absent).
    pub fn quantity_of(&self, variant_id: &str) -> i64 {
        self.items
            .iter()
            .find(|i| i.variant.id == variant_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals, before discount and tax.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total())
    }

    /// Tax on the post-discount base.
    pub fn tax(&self) -> Money {
        (self.subtotal() - self.discount).calculate_tax(self.tax_rate)
    }

    /// Amount due: max(0, subtotal − discount + tax).
    pub fn total(&self) -> Money {
        (self.subtotal() - self.discount + self.tax()).non_negative()
    }

    /// Snapshot of all derived figures.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived figures of a cart at one instant, for display and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount: cart.discount,
            tax: cart.tax(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            category: "Drinks".to_string(),
            image_url: Some(format!("https://img.example/{}.jpg", id)),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_variant(id: &str, product_id: &str, price_cents: i64) -> Variant {
        Variant {
            id: id.to_string(),
            product_id: product_id.to_string(),
            sku: format!("SKU-{}", id),
            name: "600ml".to_string(),
            price_cents,
            cost_cents: None,
            stock: 50,
            min_stock: None,
            barcode: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// total == max(0, (subtotal − discount) + tax) after every mutation.
    fn assert_totals_invariant(cart: &Cart) {
        let expected_subtotal: i64 = cart
            .items
            .iter()
            .map(|i| i.variant.price_cents * i.quantity)
            .sum();
        assert_eq!(cart.subtotal().cents(), expected_subtotal);

        let discounted = cart.subtotal() - cart.discount;
        let tax = discounted.calculate_tax(cart.tax_rate);
        assert_eq!(cart.tax(), tax);
        assert_eq!(cart.total(), (discounted + tax).non_negative());
    }

    #[test]
    fn test_add_item_appends_with_quantity_one() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 999);

        cart.add_item(&variant, &product);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 1);
        assert_eq!(cart.subtotal().cents(), 999);
        assert_eq!(cart.items[0].product_name, "Product p1");
        assert_totals_invariant(&cart);
    }

    #[test]
    fn test_duplicate_add_collapses_into_one_line() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 999);

        cart.add_item(&variant, &product);
        cart.add_item(&variant, &product);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of("v1"), 2);
        assert_totals_invariant(&cart);
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let mut variant = test_variant("v1", "p1", 1000);

        cart.add_item(&variant, &product);

        // Catalog price changes after the item is in the cart
        variant.price_cents = 9999;
        cart.add_item(&variant, &product);

        // Second add bumps quantity on the original snapshot
        assert_eq!(cart.quantity_of("v1"), 2);
        assert_eq!(cart.subtotal().cents(), 2000);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 999);
        cart.add_item(&variant, &product);

        let before = cart.totals();
        cart.remove_item("no-such-variant");

        assert_eq!(cart.totals(), before);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_quantity_sets_absolute_value() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 500);
        cart.add_item(&variant, &product);

        cart.update_quantity("v1", 7);
        assert_eq!(cart.quantity_of("v1"), 7);
        assert_eq!(cart.subtotal().cents(), 3500);
        assert_totals_invariant(&cart);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 500);

        let mut cart = Cart::new();
        cart.add_item(&variant, &product);
        cart.update_quantity("v1", 0);
        assert!(cart.is_empty());

        let mut cart = Cart::new();
        cart.add_item(&variant, &product);
        cart.update_quantity("v1", -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 500);
        cart.add_item(&variant, &product);

        cart.update_quantity("ghost", 3);
        assert_eq!(cart.quantity_of("v1"), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        for i in 0..5 {
            let id = format!("p{}", i);
            let product = test_product(&id);
            let variant = test_variant(&format!("v{}", i), &id, 100 * (i + 1));
            cart.add_item(&variant, &product);
        }
        // Re-adding an early variant must not move it
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 200);
        cart.add_item(&variant, &product);

        let ids: Vec<&str> = cart.items.iter().map(|i| i.variant.id.as_str()).collect();
        assert_eq!(ids, vec!["v0", "v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn test_vat_totals() {
        // Two lines: $100.00 × 2 and $50.00 × 1 → subtotal $250.00,
        // 16% tax $40.00, total $290.00
        let mut cart = Cart::new();
        let p1 = test_product("p1");
        let v1 = test_variant("v1", "p1", 10000);
        let p2 = test_product("p2");
        let v2 = test_variant("v2", "p2", 5000);

        cart.add_item(&v1, &p1);
        cart.add_item(&v1, &p1);
        cart.add_item(&v2, &p2);

        let totals = cart.totals();
        assert_eq!(totals.subtotal.cents(), 25000);
        assert_eq!(totals.tax.cents(), 4000);
        assert_eq!(totals.total.cents(), 29000);
        assert_totals_invariant(&cart);
    }

    #[test]
    fn test_discount_applies_before_tax() {
        // Subtotal $100.00, discount $20.00 → tax on $80.00 = $12.80
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 10000);
        cart.add_item(&variant, &product);

        cart.set_discount(Money::from_cents(2000));

        assert_eq!(cart.tax().cents(), 1280);
        assert_eq!(cart.total().cents(), 9280);
        assert_totals_invariant(&cart);
    }

    #[test]
    fn test_full_discount_zeroes_tax_and_total() {
        // Caller clamps an attempted $150.00 discount to the $100.00
        // subtotal; tax base and total both become zero
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 10000);
        cart.add_item(&variant, &product);

        let attempted = Money::from_cents(15000);
        let clamped = attempted.min(cart.subtotal());
        cart.set_discount(clamped);

        assert_eq!(cart.discount.cents(), 10000);
        assert_eq!(cart.tax().cents(), 0);
        assert_eq!(cart.total().cents(), 0);
    }

    #[test]
    fn test_total_never_negative() {
        // The engine stores an unclamped discount as given; the total
        // still floors at zero
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 1000);
        cart.add_item(&variant, &product);

        cart.set_discount(Money::from_cents(99999));
        assert_eq!(cart.total().cents(), 0);
    }

    #[test]
    fn test_clear_resets_items_and_discount() {
        let mut cart = Cart::new();
        let product = test_product("p1");
        let variant = test_variant("v1", "p1", 1000);
        cart.add_item(&variant, &product);
        cart.set_discount(Money::from_cents(100));

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.discount, Money::zero());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_totals_invariant_over_mixed_sequence() {
        let mut cart = Cart::new();
        let p1 = test_product("p1");
        let v1 = test_variant("v1", "p1", 1299);
        let p2 = test_product("p2");
        let v2 = test_variant("v2", "p2", 450);

        cart.add_item(&v1, &p1);
        assert_totals_invariant(&cart);
        cart.add_item(&v2, &p2);
        assert_totals_invariant(&cart);
        cart.update_quantity("v1", 4);
        assert_totals_invariant(&cart);
        cart.set_discount(Money::from_cents(500));
        assert_totals_invariant(&cart);
        cart.remove_item("v2");
        assert_totals_invariant(&cart);
        cart.update_quantity("v1", 0);
        assert_totals_invariant(&cart);
        assert!(cart.is_empty());
    }
}
