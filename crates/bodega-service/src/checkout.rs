//! # Checkout
//!
//! Turns a finalized cart snapshot into persisted sale records and adjusts
//! inventory. The flow writes in a fixed order so a partial failure leaves
//! the store consistent:
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌───────────────────┐
//! │ Transaction │ ──> │ TransactionItems │ ──> │ stock decrements  │
//! │   (insert)  │     │  (insert, or     │     │ (guarded, one per │
//! │             │     │   compensate)    │     │  line, best-effort)│
//! └─────────────┘     └──────────────────┘     └───────────────────┘
//! ```
//!
//! A failure while inserting item rows deletes the transaction again; a
//! refused stock decrement is recorded in the outcome but never blocks the
//! sale. The caller owns the cart and clears it after a successful submit.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use bodega_core::{
    Cart, CartItem, Money, PaymentMethod, Transaction, TransactionItem, TransactionStatus,
};
use bodega_db::Database;

use crate::error::CheckoutError;
use crate::identity::Identity;

// ============================================================================
// Request / outcome types
// ============================================================================

/// A finalized sale as handed over by the cart screen.
///
/// The monetary figures are the ones shown to the cashier at confirmation
/// time; they are persisted verbatim rather than recomputed so the receipt
/// always matches what was on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub payment_method: PaymentMethod,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Snapshots a cart into a request.
    pub fn from_cart(cart: &Cart, payment_method: PaymentMethod) -> Self {
        let totals = cart.totals();

        CheckoutRequest {
            items: cart.items.clone(),
            payment_method,
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            notes: None,
        }
    }

    /// Attaches a note to the sale (e.g. "paid with 500 bill").
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Why a stock decrement did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFailureReason {
    /// The variant had fewer units on hand than the sold quantity.
    Insufficient,
    /// The store rejected the update.
    Store(String),
}

/// One sale line whose stock decrement did not apply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFailure {
    pub variant_id: String,
    pub sku: String,
    pub quantity: i64,
    pub reason: StockFailureReason,
}

/// Result of a successful checkout.
///
/// `stock_failures` is empty on the happy path. A non-empty list means the
/// sale was recorded but one or more counts need manual reconciliation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub transaction_id: String,
    pub stock_failures: Vec<StockFailure>,
}

impl CheckoutOutcome {
    /// True when every stock decrement applied.
    pub fn is_clean(&self) -> bool {
        self.stock_failures.is_empty()
    }
}

// ============================================================================
// Service
// ============================================================================

/// Persists finalized sales.
#[derive(Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    pub fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Submits a finalized sale.
    ///
    /// ## Returns
    /// The new transaction id plus any stock lines that could not be
    /// decremented. Stock failures do not fail the submission; the sale is
    /// already money in the drawer by the time inventory is adjusted.
    pub async fn submit(
        &self,
        identity: Option<&Identity>,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let identity = identity.ok_or(CheckoutError::Unauthenticated)?;

        if request.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        debug!(
            user_id = %identity.id,
            items = request.items.len(),
            total_cents = request.total.cents(),
            "Submitting checkout"
        );

        let transactions = self.db.transactions();
        let now = Utc::now();

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: identity.id.clone(),
            subtotal_cents: request.subtotal.cents(),
            tax_cents: request.tax.cents(),
            discount_cents: request.discount.cents(),
            total_cents: request.total.cents(),
            payment_method: request.payment_method,
            status: TransactionStatus::Completed,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        transactions
            .insert(&transaction)
            .await
            .map_err(CheckoutError::TransactionCreateFailed)?;

        // Item rows. Any failure here unwinds the transaction row as well,
        // so the store never holds a sale without its lines.
        for item in &request.items {
            let row = TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction.id.clone(),
                variant_id: item.variant.id.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price().cents(),
                subtotal_cents: item.line_total().cents(),
                created_at: now,
            };

            if let Err(err) = transactions.insert_item(&row).await {
                self.compensate(&transaction.id).await;
                return Err(CheckoutError::ItemsCreateFailed(err));
            }
        }

        // Inventory. Each line is decremented independently and only while
        // enough units are on hand; a refused line is reported, not fatal.
        let products = self.db.products();
        let mut stock_failures = Vec::new();

        for item in &request.items {
            match products
                .decrement_stock(&item.variant.id, item.quantity, now)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        variant_id = %item.variant.id,
                        sku = %item.variant.sku,
                        quantity = item.quantity,
                        "Stock decrement refused: insufficient units on hand"
                    );
                    stock_failures.push(StockFailure {
                        variant_id: item.variant.id.clone(),
                        sku: item.variant.sku.clone(),
                        quantity: item.quantity,
                        reason: StockFailureReason::Insufficient,
                    });
                }
                Err(err) => {
                    warn!(
                        variant_id = %item.variant.id,
                        sku = %item.variant.sku,
                        error = %err,
                        "Stock decrement failed"
                    );
                    stock_failures.push(StockFailure {
                        variant_id: item.variant.id.clone(),
                        sku: item.variant.sku.clone(),
                        quantity: item.quantity,
                        reason: StockFailureReason::Store(err.to_string()),
                    });
                }
            }
        }

        info!(
            transaction_id = %transaction.id,
            total_cents = transaction.total_cents,
            items = request.items.len(),
            stock_failures = stock_failures.len(),
            "Checkout complete"
        );

        Ok(CheckoutOutcome {
            transaction_id: transaction.id,
            stock_failures,
        })
    }

    /// Removes a half-written sale after an item insert failure.
    ///
    /// Compensation errors are logged rather than returned; the caller is
    /// already reporting the original failure.
    async fn compensate(&self, transaction_id: &str) {
        let transactions = self.db.transactions();

        if let Err(err) = transactions.delete_items(transaction_id).await {
            error!(
                transaction_id = %transaction_id,
                error = %err,
                "Checkout compensation could not delete item rows"
            );
        }

        if let Err(err) = transactions.delete(transaction_id).await {
            error!(
                transaction_id = %transaction_id,
                error = %err,
                "Checkout compensation could not delete the transaction"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::{Product, Variant};
    use bodega_db::{Database, DbConfig};

    fn product(name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            category: "Drinks".to_string(),
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn variant(product_id: &str, sku: &str, price_cents: i64, stock: i64) -> Variant {
        let now = Utc::now();
        Variant {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            name: "Regular".to_string(),
            price_cents,
            cost_cents: None,
            stock,
            min_stock: None,
            barcode: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_variant(db: &Database, sku: &str, price_cents: i64, stock: i64) -> (Product, Variant) {
        let repo = db.products();
        let p = product(sku);
        repo.insert(&p).await.unwrap();
        let v = variant(&p.id, sku, price_cents, stock);
        repo.insert_variant(&v).await.unwrap();
        (p, v)
    }

    #[tokio::test]
    async fn test_checkout_end_to_end() {
        let db = test_db().await;
        let service = CheckoutService::new(db.clone());

        let (p1, v1) = seed_variant(&db, "COLA-600", 10_000, 5).await;
        let (p2, v2) = seed_variant(&db, "AGUA-1L", 5_000, 3).await;

        let mut cart = Cart::new();
        cart.add_item(&v1, &p1);
        cart.add_item(&v1, &p1);
        cart.add_item(&v2, &p2);

        let request = CheckoutRequest::from_cart(&cart, PaymentMethod::Cash);
        assert_eq!(request.subtotal.cents(), 25_000);
        assert_eq!(request.tax.cents(), 4_000);
        assert_eq!(request.total.cents(), 29_000);

        let identity = Identity::new("cashier-1");
        let outcome = service.submit(Some(&identity), request).await.unwrap();
        assert!(outcome.is_clean());

        // Transaction row carries the confirmed totals
        let tx = db
            .transactions()
            .get_by_id(&outcome.transaction_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.total_cents, 29_000);
        assert_eq!(tx.user_id, "cashier-1");
        assert!(tx.is_completed());

        // One item row per line with line subtotals
        let mut items = db
            .transactions()
            .items_for(&outcome.transaction_id)
            .await
            .unwrap();
        items.sort_by_key(|i| i.subtotal_cents);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].subtotal_cents, 5_000);
        assert_eq!(items[1].subtotal_cents, 20_000);

        // Stock decremented by sold quantity
        let v1_after = db.products().get_variant(&v1.id).await.unwrap().unwrap();
        let v2_after = db.products().get_variant(&v2.id).await.unwrap().unwrap();
        assert_eq!(v1_after.stock, 3);
        assert_eq!(v2_after.stock, 2);
    }

    #[tokio::test]
    async fn test_checkout_requires_identity() {
        let db = test_db().await;
        let service = CheckoutService::new(db.clone());

        let (p, v) = seed_variant(&db, "COLA-600", 10_000, 5).await;
        let mut cart = Cart::new();
        cart.add_item(&v, &p);

        let request = CheckoutRequest::from_cart(&cart, PaymentMethod::Cash);
        let err = service.submit(None, request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Unauthenticated));

        // Nothing persisted, stock untouched
        assert!(db.transactions().list_completed().await.unwrap().is_empty());
        let after = db.products().get_variant(&v.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 5);
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let db = test_db().await;
        let service = CheckoutService::new(db.clone());

        let cart = Cart::new();
        let request = CheckoutRequest::from_cart(&cart, PaymentMethod::Card);

        let identity = Identity::new("cashier-1");
        let err = service.submit(Some(&identity), request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(db.transactions().list_completed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_item_failure_compensates_transaction() {
        let db = test_db().await;
        let service = CheckoutService::new(db.clone());

        // Variant never persisted, so the item row violates its FK
        let p = product("Ghost");
        let v = variant(&p.id, "GHOST-1", 1_000, 10);

        let mut cart = Cart::new();
        cart.add_item(&v, &p);

        let identity = Identity::new("cashier-1");
        let request = CheckoutRequest::from_cart(&cart, PaymentMethod::Cash);
        let err = service.submit(Some(&identity), request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::ItemsCreateFailed(_)));

        // The half-written transaction was deleted again
        assert!(db.transactions().list_completed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_reported_not_fatal() {
        let db = test_db().await;
        let service = CheckoutService::new(db.clone());

        let (p, v) = seed_variant(&db, "LAST-ONE", 2_000, 1).await;

        let mut cart = Cart::new();
        cart.add_item(&v, &p);
        cart.update_quantity(&v.id, 2);

        let identity = Identity::new("cashier-1");
        let request = CheckoutRequest::from_cart(&cart, PaymentMethod::Cash);
        let outcome = service.submit(Some(&identity), request).await.unwrap();

        assert_eq!(outcome.stock_failures.len(), 1);
        assert_eq!(outcome.stock_failures[0].variant_id, v.id);
        assert_eq!(outcome.stock_failures[0].quantity, 2);
        assert_eq!(
            outcome.stock_failures[0].reason,
            StockFailureReason::Insufficient
        );

        // Sale recorded, stock left as-is for reconciliation
        let tx = db
            .transactions()
            .get_by_id(&outcome.transaction_id)
            .await
            .unwrap();
        assert!(tx.is_some());
        let after = db.products().get_variant(&v.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 1);
    }
}
