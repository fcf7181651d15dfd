//! # Transaction Repository
//!
//! Database operations for recorded sales and their line items.
//!
//! ## Key Operations
//! - Insert transaction + item rows (checkout writes)
//! - Compensating deletes when an item insert fails mid-checkout
//! - Report reads: completed transactions, recent sales with cashier name,
//!   per-product sale lines for top-seller ranking
//!
//! ## Report Row Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Joins produce dedicated row structs                        │
//! │                                                                         │
//! │  recent_with_cashier:                                                   │
//! │    transactions ──LEFT JOIN── profiles     (cashier may be deleted)     │
//! │                 ──subquery─── COUNT(items)                              │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │            RecentTransactionRow { ..., cashier_name: Option<String> }   │
//! │                                                                         │
//! │  product_sales:                                                         │
//! │    transaction_items ──JOIN── variants ──JOIN── products                │
//! │                      ──JOIN── transactions (status = completed)         │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │            ProductSaleRow → bodega_core::reports::ProductSale           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use bodega_core::reports::ProductSale;
use bodega_core::{Money, PaymentMethod, Transaction, TransactionItem, TransactionStatus};

use crate::error::{DbError, DbResult};

// =============================================================================
// Join Row Shapes
// =============================================================================

/// A recent transaction joined with the cashier's display name and its
/// item count.
///
/// `cashier_name` is None when the profile row is gone (profiles are
/// deletable; sales history is not). Presentation picks the fallback text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentTransactionRow {
    pub id: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
    pub cashier_name: Option<String>,
}

/// One sold line attributed to its product, from completed sales only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductSaleRow {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub quantity: i64,
    pub subtotal_cents: i64,
}

impl From<ProductSaleRow> for ProductSale {
    fn from(row: ProductSaleRow) -> Self {
        ProductSale {
            product_id: row.product_id,
            product_name: row.product_name,
            product_image: row.product_image,
            quantity: row.quantity,
            subtotal: Money::from_cents(row.subtotal_cents),
        }
    }
}

/// Per-cashier aggregate: how many sales they rang and the completed total.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct UserSalesTotals {
    /// All of the user's transactions, any status.
    pub transactions: i64,
    /// Summed totals of the completed ones.
    pub sales_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for transaction database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = TransactionRepository::new(pool);
///
/// repo.insert(&transaction).await?;
/// for item in &items {
///     repo.insert_item(item).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a transaction row.
    pub async fn insert(&self, transaction: &Transaction) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO transactions \
                 (id, user_id, subtotal_cents, tax_cents, discount_cents, \
                  total_cents, payment_method, status, notes, created_at, \
                  updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&transaction.id)
        .bind(&transaction.user_id)
        .bind(transaction.subtotal_cents)
        .bind(transaction.tax_cents)
        .bind(transaction.discount_cents)
        .bind(transaction.total_cents)
        .bind(transaction.payment_method)
        .bind(transaction.status)
        .bind(&transaction.notes)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(transaction_id = %transaction.id, total_cents = transaction.total_cents, "Inserted transaction");
        Ok(())
    }

    /// Inserts one line item.
    ///
    /// Fails with ForeignKeyViolation when the variant id doesn't exist;
    /// checkout compensates by deleting what it already wrote.
    pub async fn insert_item(&self, item: &TransactionItem) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO transaction_items \
                 (id, transaction_id, variant_id, quantity, unit_price_cents, \
                  subtotal_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&item.id)
        .bind(&item.transaction_id)
        .bind(&item.variant_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes all item rows of a transaction (compensation path).
    ///
    /// ## Returns
    /// Number of rows deleted.
    pub async fn delete_items(&self, transaction_id: &str) -> DbResult<u64> {
        let result =
            sqlx::query("DELETE FROM transaction_items WHERE transaction_id = ?1")
                .bind(transaction_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a transaction row (compensation path).
    pub async fn delete(&self, transaction_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(transaction_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", transaction_id));
        }

        debug!(transaction_id = %transaction_id, "Deleted transaction");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a transaction by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT id, user_id, subtotal_cents, tax_cents, discount_cents, \
                    total_cents, payment_method, status, notes, created_at, \
                    updated_at \
             FROM transactions \
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Lists the items of one transaction in creation order.
    pub async fn items_for(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            "SELECT id, transaction_id, variant_id, quantity, unit_price_cents, \
                    subtotal_cents, created_at \
             FROM transaction_items \
             WHERE transaction_id = ?1 \
             ORDER BY created_at, id",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// All completed transactions, oldest first.
    ///
    /// Period bucketing and summing happen in bodega-core over these rows;
    /// a corner store's full history fits comfortably in memory.
    pub async fn list_completed(&self) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT id, user_id, subtotal_cents, tax_cents, discount_cents, \
                    total_cents, payment_method, status, notes, created_at, \
                    updated_at \
             FROM transactions \
             WHERE status = 'completed' \
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Completed transactions created at or after `start`, oldest first.
    pub async fn list_completed_since(
        &self,
        start: DateTime<Utc>,
    ) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT id, user_id, subtotal_cents, tax_cents, discount_cents, \
                    total_cents, payment_method, status, notes, created_at, \
                    updated_at \
             FROM transactions \
             WHERE status = 'completed' AND created_at >= ?1 \
             ORDER BY created_at",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Latest transactions (any status) with cashier name and item count,
    /// newest first.
    pub async fn recent_with_cashier(&self, limit: i64) -> DbResult<Vec<RecentTransactionRow>> {
        let rows = sqlx::query_as::<_, RecentTransactionRow>(
            "SELECT t.id, t.total_cents, t.payment_method, t.status, t.created_at, \
                    (SELECT COUNT(*) FROM transaction_items i \
                      WHERE i.transaction_id = t.id) AS item_count, \
                    p.full_name AS cashier_name \
             FROM transactions t \
             LEFT JOIN profiles p ON p.id = t.user_id \
             ORDER BY t.created_at DESC \
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sold lines of completed transactions attributed to their products,
    /// in sale order (top-seller ranking input).
    pub async fn product_sales(&self) -> DbResult<Vec<ProductSaleRow>> {
        let rows = sqlx::query_as::<_, ProductSaleRow>(
            "SELECT p.id AS product_id, p.name AS product_name, \
                    p.image_url AS product_image, i.quantity, i.subtotal_cents \
             FROM transaction_items i \
             INNER JOIN transactions t ON t.id = i.transaction_id \
             INNER JOIN variants v ON v.id = i.variant_id \
             INNER JOIN products p ON p.id = v.product_id \
             WHERE t.status = 'completed' \
             ORDER BY i.created_at, i.id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-cashier transaction count (any status) and completed-sales total.
    pub async fn totals_for_user(&self, user_id: &str) -> DbResult<UserSalesTotals> {
        let totals = sqlx::query_as::<_, UserSalesTotals>(
            "SELECT COUNT(*) AS transactions, \
                    COALESCE(SUM(CASE WHEN status = 'completed' \
                                      THEN total_cents ELSE 0 END), 0) AS sales_cents \
             FROM transactions \
             WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
