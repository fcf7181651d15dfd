//! # Product Repository
//!
//! Database operations for products and their variants.
//!
//! ## Key Operations
//! - Catalog listing with search/category/status filters
//! - Product and variant CRUD (the variant diff on update lives in the
//!   service layer; this module provides the primitive writes)
//! - Guarded stock decrement for checkout
//! - Low-stock join rows for the dashboard
//!
//! ## Guarded Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Why the decrement carries its own guard                   │
//! │                                                                         │
//! │  UPDATE variants                                                        │
//! │  SET stock = stock - :qty                                               │
//! │  WHERE id = :id AND stock >= :qty                                       │
//! │            ───────────┬──────────                                       │
//! │                       │                                                 │
//! │  Two concurrent checkouts selling the last unit:                        │
//! │                                                                         │
//! │  Checkout A ──► stock 1 ≥ 1 → row updated, stock = 0                   │
//! │  Checkout B ──► stock 0 < 1 → zero rows, caller records the miss       │
//! │                                                                         │
//! │  SQLite serializes the two updates; the guard decides the loser.        │
//! │  The CHECK (stock >= 0) constraint backs this up at the schema level.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use bodega_core::{Product, Variant, DEFAULT_MIN_STOCK};

use crate::error::{DbError, DbResult};

// =============================================================================
// Filters
// =============================================================================

/// Activity filter for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Active and inactive products.
    #[default]
    All,
    /// Only `is_active = 1`.
    Active,
    /// Only `is_active = 0`.
    Inactive,
}

/// Filter for [`ProductRepository::list`].
///
/// ## Example
/// ```rust,ignore
/// let filter = ProductFilter {
///     search: Some("cola".to_string()),
///     category: Some("Drinks".to_string()),
///     status: StatusFilter::Active,
/// };
/// let products = repo.list(&filter).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,

    /// Exact category match.
    pub category: Option<String>,

    /// Activity filter.
    pub status: StatusFilter,
}

// =============================================================================
// Join Row Shapes
// =============================================================================

/// A low-stock variant joined with its parent product's display fields.
///
/// Produced by [`ProductRepository::low_stock`], ordered by stock ascending
/// so the most urgent restocks come first.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStockRow {
    /// Variant id.
    pub variant_id: String,
    /// Parent product name.
    pub product_name: String,
    /// Variant display name.
    pub variant_name: String,
    pub sku: String,
    pub stock: i64,
    /// Raw threshold; `None` means the default applies.
    pub min_stock: Option<i64>,
    /// Parent product image.
    pub image_url: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product and variant database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let products = repo.list_active().await?;
/// let variants = repo.variants_for_product(&products[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Product Reads
    // =========================================================================

    /// Lists products matching a filter, newest first.
    ///
    /// ## Filter Semantics
    /// - `search` - case-insensitive substring on the name (SQLite LIKE)
    /// - `category` - exact match
    /// - `status` - all / active / inactive
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let mut sql = String::from(
            "SELECT id, name, description, category, image_url, is_active, \
                    created_at, updated_at \
             FROM products WHERE 1 = 1",
        );
        if filter.search.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        match filter.status {
            StatusFilter::All => {}
            StatusFilter::Active => sql.push_str(" AND is_active = 1"),
            StatusFilter::Inactive => sql.push_str(" AND is_active = 0"),
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        if let Some(search) = &filter.search {
            query = query.bind(format!("%{}%", search));
        }
        if let Some(category) = &filter.category {
            query = query.bind(category.clone());
        }

        let products = query.fetch_all(&self.pool).await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists active products sorted by name (the POS catalog read).
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, category, image_url, is_active, \
                    created_at, updated_at \
             FROM products \
             WHERE is_active = 1 \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, category, image_url, is_active, \
                    created_at, updated_at \
             FROM products \
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Distinct non-empty category names, sorted.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products \
             WHERE category <> '' \
             ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Counts active products (dashboard stat).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    // =========================================================================
    // Product Writes
    // =========================================================================

    /// Inserts a product row.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO products \
                 (id, name, description, category, image_url, is_active, \
                  created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(product_id = %product.id, "Inserted product");
        Ok(())
    }

    /// Updates a product's mutable fields.
    ///
    /// ## Returns
    /// NotFound when the id doesn't exist.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products \
             SET name = ?2, description = ?3, category = ?4, image_url = ?5, \
                 is_active = ?6, updated_at = ?7 \
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }
        Ok(())
    }

    /// Activates or deactivates a product (soft availability).
    pub async fn set_status(
        &self,
        id: &str,
        is_active: bool,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(is_active)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = %id, is_active, "Set product status");
        Ok(())
    }

    /// Deletes a product row.
    ///
    /// Callers delete the variants first; a variant with recorded sales
    /// makes that fail with a ForeignKeyViolation (RESTRICT) and the
    /// product row stays.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = %id, "Deleted product");
        Ok(())
    }

    // =========================================================================
    // Variant Reads
    // =========================================================================

    /// Gets a variant by its ID.
    pub async fn get_variant(&self, id: &str) -> DbResult<Option<Variant>> {
        let variant = sqlx::query_as::<_, Variant>(
            "SELECT id, product_id, sku, name, price_cents, cost_cents, stock, \
                    min_stock, barcode, is_active, created_at, updated_at \
             FROM variants \
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Lists a product's variants in creation order.
    pub async fn variants_for_product(&self, product_id: &str) -> DbResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(
            "SELECT id, product_id, sku, name, price_cents, cost_cents, stock, \
                    min_stock, barcode, is_active, created_at, updated_at \
             FROM variants \
             WHERE product_id = ?1 \
             ORDER BY created_at, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// Lists variants for a set of products in one query.
    ///
    /// The id set is bound as a JSON array and unpacked with `json_each`,
    /// which keeps the statement parameterized regardless of set size.
    pub async fn variants_for_products(&self, product_ids: &[String]) -> DbResult<Vec<Variant>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids_json =
            serde_json::to_string(product_ids).map_err(|e| DbError::Internal(e.to_string()))?;

        let variants = sqlx::query_as::<_, Variant>(
            "SELECT id, product_id, sku, name, price_cents, cost_cents, stock, \
                    min_stock, barcode, is_active, created_at, updated_at \
             FROM variants \
             WHERE product_id IN (SELECT value FROM json_each(?1)) \
             ORDER BY created_at, id",
        )
        .bind(ids_json)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// All variants belonging to active products (low-stock counting).
    pub async fn variants_of_active_products(&self) -> DbResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(
            "SELECT v.id, v.product_id, v.sku, v.name, v.price_cents, v.cost_cents, \
                    v.stock, v.min_stock, v.barcode, v.is_active, v.created_at, \
                    v.updated_at \
             FROM variants v \
             INNER JOIN products p ON p.id = v.product_id \
             WHERE p.is_active = 1",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// Low-stock variants of active products joined with product display
    /// fields, most depleted first.
    ///
    /// `stock <= COALESCE(min_stock, default)` - zero stock rows sort to the
    /// top so Critical items lead the list.
    pub async fn low_stock(&self, limit: i64) -> DbResult<Vec<LowStockRow>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            "SELECT v.id AS variant_id, p.name AS product_name, v.name AS variant_name, \
                    v.sku, v.stock, v.min_stock, p.image_url \
             FROM variants v \
             INNER JOIN products p ON p.id = v.product_id \
             WHERE p.is_active = 1 AND v.stock <= COALESCE(v.min_stock, ?1) \
             ORDER BY v.stock ASC, v.sku ASC \
             LIMIT ?2",
        )
        .bind(DEFAULT_MIN_STOCK)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Variant Writes
    // =========================================================================

    /// Inserts a variant row.
    ///
    /// Fails with UniqueViolation on a duplicate SKU and ForeignKeyViolation
    /// when the parent product doesn't exist.
    pub async fn insert_variant(&self, variant: &Variant) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO variants \
                 (id, product_id, sku, name, price_cents, cost_cents, stock, \
                  min_stock, barcode, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.sku)
        .bind(&variant.name)
        .bind(variant.price_cents)
        .bind(variant.cost_cents)
        .bind(variant.stock)
        .bind(variant.min_stock)
        .bind(&variant.barcode)
        .bind(variant.is_active)
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(variant_id = %variant.id, sku = %variant.sku, "Inserted variant");
        Ok(())
    }

    /// Updates a variant's mutable fields.
    pub async fn update_variant(&self, variant: &Variant) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE variants \
             SET sku = ?2, name = ?3, price_cents = ?4, cost_cents = ?5, \
                 stock = ?6, min_stock = ?7, barcode = ?8, is_active = ?9, \
                 updated_at = ?10 \
             WHERE id = ?1",
        )
        .bind(&variant.id)
        .bind(&variant.sku)
        .bind(&variant.name)
        .bind(variant.price_cents)
        .bind(variant.cost_cents)
        .bind(variant.stock)
        .bind(variant.min_stock)
        .bind(&variant.barcode)
        .bind(variant.is_active)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", &variant.id));
        }
        Ok(())
    }

    /// Deletes one variant row. RESTRICT applies when sales reference it.
    pub async fn delete_variant(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM variants WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", id));
        }
        Ok(())
    }

    /// Deletes a product's variants that are NOT in the keep set (the
    /// removal half of the variant diff on product update).
    ///
    /// ## Returns
    /// Number of rows deleted.
    pub async fn delete_variants_except(
        &self,
        product_id: &str,
        keep_ids: &[String],
    ) -> DbResult<u64> {
        let ids_json =
            serde_json::to_string(keep_ids).map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query(
            "DELETE FROM variants \
             WHERE product_id = ?1 \
               AND id NOT IN (SELECT value FROM json_each(?2))",
        )
        .bind(product_id)
        .bind(ids_json)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes all of a product's variants (the first half of a hard
    /// product delete).
    pub async fn delete_variants_for_product(&self, product_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM variants WHERE product_id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Applies a guarded stock decrement.
    ///
    /// ## Returns
    /// * `Ok(true)` - stock was sufficient and has been reduced by `quantity`
    /// * `Ok(false)` - stock was insufficient; the row is untouched
    ///
    /// Under concurrent checkouts SQLite serializes the updates and the
    /// `stock >= quantity` guard decides the loser; stock never goes
    /// negative.
    pub async fn decrement_stock(
        &self,
        variant_id: &str,
        quantity: i64,
        updated_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE variants \
             SET stock = stock - ?2, updated_at = ?3 \
             WHERE id = ?1 AND stock >= ?2",
        )
        .bind(variant_id)
        .bind(quantity)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;
        debug!(variant_id = %variant_id, quantity, applied, "Stock decrement");
        Ok(applied)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
