//! # Catalog Administration
//!
//! Product and variant management for the admin screen plus the POS catalog
//! read. Products are always handled together with their variants: a product
//! without at least one variant cannot be sold, so submissions are validated
//! as a unit and writes that leave a product variant-less are unwound.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use bodega_core::validation::{
    validate_category, validate_cost_cents, validate_min_stock, validate_price_cents,
    validate_product_name, validate_search_query, validate_sku, validate_stock,
    validate_variant_name,
};
use bodega_core::{Product, ValidationError, Variant};
use bodega_db::{Database, ProductFilter};

use crate::error::{ServiceError, ServiceResult};

// ============================================================================
// Input / output types
// ============================================================================

/// A product together with its sellable variants.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
}

/// Product fields as submitted by the admin form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub is_active: bool,
}

/// One variant row as submitted by the admin form.
///
/// `id` is `Some` for a persisted variant being edited and `None` for a new
/// row; `update_product` diffs on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub id: Option<String>,
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub stock: i64,
    pub min_stock: Option<i64>,
    pub barcode: Option<String>,
    pub is_active: bool,
}

// ============================================================================
// Service
// ============================================================================

/// Catalog reads and admin writes.
#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Products matching the filter, newest first, each with its variants.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> ServiceResult<Vec<ProductWithVariants>> {
        let mut filter = filter.clone();
        if let Some(search) = filter.search.take() {
            let cleaned = validate_search_query(&search)?;
            if !cleaned.is_empty() {
                filter.search = Some(cleaned);
            }
        }

        let products = self.db.products().list(&filter).await?;
        self.attach_variants(products).await
    }

    /// The POS catalog: active products in name order with their variants.
    pub async fn active_products(&self) -> ServiceResult<Vec<ProductWithVariants>> {
        let products = self.db.products().list_active().await?;
        self.attach_variants(products).await
    }

    /// One product with its variants.
    pub async fn get_product(&self, id: &str) -> ServiceResult<ProductWithVariants> {
        let repo = self.db.products();

        let product = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        let variants = repo.variants_for_product(id).await?;

        Ok(ProductWithVariants { product, variants })
    }

    /// Distinct category names in use, sorted.
    pub async fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.db.products().categories().await?)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Creates a product with its variants.
    ///
    /// The product row is written first; if any variant insert fails the
    /// product (and any variants already written) are deleted again so the
    /// catalog never holds a product that cannot be sold.
    pub async fn create_product(
        &self,
        input: ProductInput,
        variants: Vec<VariantInput>,
    ) -> ServiceResult<ProductWithVariants> {
        validate_submission(&input, &variants)?;

        let repo = self.db.products();
        let now = Utc::now();

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            category: input.category.trim().to_string(),
            image_url: input.image_url,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        repo.insert(&product).await?;

        let mut inserted = Vec::with_capacity(variants.len());
        for submitted in &variants {
            let row = variant_row(&product.id, submitted, now);

            if let Err(err) = repo.insert_variant(&row).await {
                self.compensate_create(&product.id).await;
                return Err(err.into());
            }

            inserted.push(row);
        }

        info!(
            product_id = %product.id,
            name = %product.name,
            variants = inserted.len(),
            "Product created"
        );

        Ok(ProductWithVariants {
            product,
            variants: inserted,
        })
    }

    /// Updates a product and reconciles its variant set.
    ///
    /// Submitted rows with an id replace their persisted counterparts, rows
    /// without an id are inserted, and persisted variants missing from the
    /// submission are deleted.
    pub async fn update_product(
        &self,
        id: &str,
        input: ProductInput,
        variants: Vec<VariantInput>,
    ) -> ServiceResult<ProductWithVariants> {
        validate_submission(&input, &variants)?;

        let repo = self.db.products();

        let existing = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        let persisted: HashMap<String, Variant> = repo
            .variants_for_product(id)
            .await?
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect();

        let now = Utc::now();

        let product = Product {
            id: existing.id.clone(),
            name: input.name.trim().to_string(),
            description: input.description,
            category: input.category.trim().to_string(),
            image_url: input.image_url,
            is_active: input.is_active,
            created_at: existing.created_at,
            updated_at: now,
        };

        repo.update(&product).await?;

        // Drop persisted variants absent from the submission first so a
        // freed-up SKU can be reused by an insert below.
        let keep_ids: Vec<String> = variants.iter().filter_map(|v| v.id.clone()).collect();
        let removed = repo.delete_variants_except(id, &keep_ids).await?;
        if removed > 0 {
            debug!(product_id = %id, removed, "Variants removed during update");
        }

        for submitted in &variants {
            let mut row = variant_row(id, submitted, now);

            match &submitted.id {
                Some(variant_id) => {
                    let original = persisted.get(variant_id).ok_or_else(|| {
                        ServiceError::not_found("Variant", variant_id)
                    })?;
                    row.created_at = original.created_at;
                    repo.update_variant(&row).await?;
                }
                None => {
                    repo.insert_variant(&row).await?;
                }
            }
        }

        let variants = repo.variants_for_product(id).await?;

        info!(
            product_id = %id,
            variants = variants.len(),
            "Product updated"
        );

        Ok(ProductWithVariants { product, variants })
    }

    /// Activates or deactivates a product.
    pub async fn set_product_status(&self, id: &str, active: bool) -> ServiceResult<()> {
        self.db
            .products()
            .set_status(id, active, Utc::now())
            .await?;

        info!(product_id = %id, active, "Product status changed");
        Ok(())
    }

    /// Permanently deletes a product and its variants.
    ///
    /// Fails with a foreign key violation when any variant appears in sales
    /// history; deactivate instead of deleting in that case.
    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        let repo = self.db.products();

        repo.delete_variants_for_product(id).await?;
        repo.delete(id).await?;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn attach_variants(
        &self,
        products: Vec<Product>,
    ) -> ServiceResult<Vec<ProductWithVariants>> {
        let ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
        let variants = self.db.products().variants_for_products(&ids).await?;

        let mut by_product: HashMap<String, Vec<Variant>> = HashMap::new();
        for variant in variants {
            by_product
                .entry(variant.product_id.clone())
                .or_default()
                .push(variant);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let variants = by_product.remove(&product.id).unwrap_or_default();
                ProductWithVariants { product, variants }
            })
            .collect())
    }

    /// Removes a half-written product after a variant insert failure.
    async fn compensate_create(&self, product_id: &str) {
        let repo = self.db.products();

        if let Err(err) = repo.delete_variants_for_product(product_id).await {
            error!(
                product_id = %product_id,
                error = %err,
                "Create compensation could not delete variant rows"
            );
        }

        if let Err(err) = repo.delete(product_id).await {
            error!(
                product_id = %product_id,
                error = %err,
                "Create compensation could not delete the product"
            );
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_submission(
    input: &ProductInput,
    variants: &[VariantInput],
) -> Result<(), ValidationError> {
    validate_product_name(&input.name)?;
    validate_category(&input.category)?;

    if variants.is_empty() {
        return Err(ValidationError::Required {
            field: "variants".to_string(),
        });
    }

    let mut seen_skus = HashSet::new();
    for variant in variants {
        validate_sku(&variant.sku)?;
        validate_variant_name(&variant.name)?;
        validate_price_cents(variant.price_cents)?;
        if let Some(cost) = variant.cost_cents {
            validate_cost_cents(cost)?;
        }
        validate_stock(variant.stock)?;
        if let Some(min) = variant.min_stock {
            validate_min_stock(min)?;
        }

        if !seen_skus.insert(variant.sku.trim().to_string()) {
            return Err(ValidationError::Duplicate {
                field: "sku".to_string(),
                value: variant.sku.trim().to_string(),
            });
        }
    }

    Ok(())
}

fn variant_row(product_id: &str, input: &VariantInput, now: DateTime<Utc>) -> Variant {
    Variant {
        id: input
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        product_id: product_id.to_string(),
        sku: input.sku.trim().to_string(),
        name: input.name.trim().to_string(),
        price_cents: input.price_cents,
        cost_cents: input.cost_cents,
        stock: input.stock,
        min_stock: input.min_stock,
        barcode: input.barcode.clone(),
        is_active: input.is_active,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_db::DbConfig;

    fn product_input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: None,
            category: "Drinks".to_string(),
            image_url: None,
            is_active: true,
        }
    }

    fn variant_input(sku: &str, price_cents: i64, stock: i64) -> VariantInput {
        VariantInput {
            id: None,
            sku: sku.to_string(),
            name: "Regular".to_string(),
            price_cents,
            cost_cents: None,
            stock,
            min_stock: None,
            barcode: None,
            is_active: true,
        }
    }

    async fn test_service() -> (Database, CatalogService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CatalogService::new(db.clone());
        (db, service)
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let (_db, service) = test_service().await;

        let created = service
            .create_product(
                product_input("Coca-Cola"),
                vec![
                    variant_input("COLA-600", 2_500, 24),
                    variant_input("COLA-2L", 4_000, 12),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.variants.len(), 2);

        let fetched = service.get_product(&created.product.id).await.unwrap();
        assert_eq!(fetched.product.name, "Coca-Cola");
        assert_eq!(fetched.variants.len(), 2);

        let err = service.get_product("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (_db, service) = test_service().await;

        // Empty name
        let err = service
            .create_product(product_input("  "), vec![variant_input("A-1", 100, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // No variants
        let err = service
            .create_product(product_input("Cola"), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Duplicate SKU within the submission
        let err = service
            .create_product(
                product_input("Cola"),
                vec![variant_input("A-1", 100, 0), variant_input("A-1", 200, 0)],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::Duplicate { .. })
        ));

        // Zero price
        let err = service
            .create_product(product_input("Cola"), vec![variant_input("A-1", 0, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_compensates_on_variant_failure() {
        let (db, service) = test_service().await;

        // Occupy the SKU so the second variant insert hits the unique index
        service
            .create_product(product_input("First"), vec![variant_input("TAKEN-1", 100, 0)])
            .await
            .unwrap();

        let err = service
            .create_product(
                product_input("Second"),
                vec![variant_input("FRESH-1", 100, 0), variant_input("TAKEN-1", 100, 0)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));

        // The half-written product is gone along with its first variant
        let all = db
            .products()
            .list(&ProductFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "First");
    }

    #[tokio::test]
    async fn test_update_diffs_variants() {
        let (_db, service) = test_service().await;

        let created = service
            .create_product(
                product_input("Cola"),
                vec![
                    variant_input("KEEP-1", 1_000, 5),
                    variant_input("DROP-1", 2_000, 5),
                ],
            )
            .await
            .unwrap();

        let kept = created
            .variants
            .iter()
            .find(|v| v.sku == "KEEP-1")
            .unwrap();

        // Keep one (repriced), drop one, add one
        let mut keep = variant_input("KEEP-1", 1_500, 5);
        keep.id = Some(kept.id.clone());

        let updated = service
            .update_product(
                &created.product.id,
                product_input("Cola Renamed"),
                vec![keep, variant_input("NEW-1", 3_000, 10)],
            )
            .await
            .unwrap();

        assert_eq!(updated.product.name, "Cola Renamed");
        assert_eq!(updated.variants.len(), 2);

        let skus: Vec<&str> = updated.variants.iter().map(|v| v.sku.as_str()).collect();
        assert!(skus.contains(&"KEEP-1"));
        assert!(skus.contains(&"NEW-1"));
        assert!(!skus.contains(&"DROP-1"));

        let repriced = updated
            .variants
            .iter()
            .find(|v| v.sku == "KEEP-1")
            .unwrap();
        assert_eq!(repriced.price_cents, 1_500);
        assert_eq!(repriced.id, kept.id);
        assert_eq!(repriced.created_at, kept.created_at);
    }

    #[tokio::test]
    async fn test_list_filters_and_categories() {
        let (_db, service) = test_service().await;

        service
            .create_product(product_input("Coca-Cola"), vec![variant_input("C-1", 100, 1)])
            .await
            .unwrap();
        let mut snacks = product_input("Doritos");
        snacks.category = "Snacks".to_string();
        service
            .create_product(snacks, vec![variant_input("D-1", 100, 1)])
            .await
            .unwrap();

        let found = service
            .list_products(&ProductFilter {
                search: Some("cola".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product.name, "Coca-Cola");
        assert_eq!(found[0].variants.len(), 1);

        let categories = service.categories().await.unwrap();
        assert_eq!(categories, vec!["Drinks".to_string(), "Snacks".to_string()]);
    }

    #[tokio::test]
    async fn test_status_and_delete() {
        let (_db, service) = test_service().await;

        let created = service
            .create_product(product_input("Cola"), vec![variant_input("C-1", 100, 1)])
            .await
            .unwrap();

        service
            .set_product_status(&created.product.id, false)
            .await
            .unwrap();
        assert!(service.active_products().await.unwrap().is_empty());

        service.delete_product(&created.product.id).await.unwrap();
        let err = service.get_product(&created.product.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
