//! # Seed Data Generator
//!
//! Populates the database with a demo catalog, user profiles, and a spread
//! of historical sales for dashboard development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults (30 days of sales history)
//! cargo run -p bodega-db --bin seed
//!
//! # Custom history window
//! cargo run -p bodega-db --bin seed -- --days 60
//!
//! # Specify database path
//! cargo run -p bodega-db --bin seed -- --db ./data/bodega.db
//! ```
//!
//! ## Generated Data
//! - A corner-store catalog: products with 1-3 variants each, a few of
//!   them deliberately at low/zero stock so the dashboard has something
//!   to warn about
//! - Profiles: one admin and two cashiers
//! - Completed transactions spread over the history window (plus a couple
//!   of cancelled ones), with item rows and matching stock decrements

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bodega_core::{
    Money, PaymentMethod, Product, Profile, TaxRate, Transaction, TransactionItem,
    TransactionStatus, UserRole, Variant,
};
use bodega_db::{Database, DbConfig};

/// Demo catalog: (name, category, variants as (variant name, sku, price cents, stock)).
const CATALOG: &[(&str, &str, &[(&str, &str, i64, i64)])] = &[
    (
        "Coca-Cola",
        "Bebidas",
        &[
            ("600ml", "COCA-600", 1800, 48),
            ("2L", "COCA-2L", 3500, 24),
            ("Lata 355ml", "COCA-355", 1500, 60),
        ],
    ),
    (
        "Agua Ciel",
        "Bebidas",
        &[("1L", "CIEL-1L", 1200, 36), ("600ml", "CIEL-600", 900, 3)],
    ),
    (
        "Jugo Del Valle",
        "Bebidas",
        &[("Mango 413ml", "VALLE-MAN", 1400, 18), ("Manzana 413ml", "VALLE-MAN2", 1400, 12)],
    ),
    (
        "Sabritas Original",
        "Botanas",
        &[("45g", "SABR-45", 1700, 40), ("Familiar 170g", "SABR-170", 5400, 8)],
    ),
    (
        "Doritos Nacho",
        "Botanas",
        &[("62g", "DORI-62", 1900, 0)],
    ),
    (
        "Galletas Marías",
        "Abarrotes",
        &[("Paquete 170g", "MARIA-170", 1600, 25)],
    ),
    (
        "Arroz San José",
        "Abarrotes",
        &[("1kg", "ARROZ-1K", 3200, 15)],
    ),
    (
        "Frijol Negro",
        "Abarrotes",
        &[("900g", "FRIJOL-900", 3800, 2)],
    ),
    (
        "Leche Lala Entera",
        "Lácteos",
        &[("1L", "LALA-1L", 2600, 20), ("Deslactosada 1L", "LALA-DES", 2900, 10)],
    ),
    (
        "Yogurt Danone",
        "Lácteos",
        &[("Fresa 900g", "DAN-FRESA", 4200, 9)],
    ),
    (
        "Jabón Zote",
        "Limpieza",
        &[("Barra 200g", "ZOTE-200", 1500, 30)],
    ),
    (
        "Cloro Cloralex",
        "Limpieza",
        &[("950ml", "CLORX-950", 2300, 14)],
    ),
];

/// Demo profiles: (auth id, role, full name).
const PROFILES: &[(&str, UserRole, &str)] = &[
    ("seed-admin-1", UserRole::Admin, "Doña Mari"),
    ("seed-cashier-1", UserRole::Cashier, "Ana López"),
    ("seed-cashier-2", UserRole::Cashier, "Carlos Ruiz"),
];

const PAYMENT_METHODS: &[PaymentMethod] =
    &[PaymentMethod::Cash, PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 30;
    let mut db_path = String::from("./bodega_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bodega POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --days <N>     Days of sales history to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./bodega_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bodega POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("History:  {} days", days);
    println!();

    // Connect to database (runs migrations)
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Refuse to double-seed
    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // --- Profiles ---------------------------------------------------------
    for (id, role, full_name) in PROFILES {
        let now = Utc::now();
        let profile = Profile {
            id: (*id).to_string(),
            role: *role,
            full_name: (*full_name).to_string(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        db.profiles().insert(&profile).await?;
    }
    println!("✓ Seeded {} profiles", PROFILES.len());

    // --- Catalog ----------------------------------------------------------
    // Variants get extra headroom on top of their target stock so the
    // historical sales below can decrement down to the figures in CATALOG.
    let mut variant_ids: Vec<(String, i64)> = Vec::new(); // (variant id, price)
    let mut seeded_variants = 0;

    for (name, category, variants) in CATALOG {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            description: None,
            category: (*category).to_string(),
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;

        for (variant_name, sku, price_cents, stock) in *variants {
            let variant = Variant {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                sku: (*sku).to_string(),
                name: (*variant_name).to_string(),
                price_cents: *price_cents,
                cost_cents: Some(price_cents * 70 / 100),
                stock: stock + 200, // headroom consumed by history below
                min_stock: Some(5),
                barcode: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            db.products().insert_variant(&variant).await?;
            variant_ids.push((variant.id.clone(), *price_cents));
            seeded_variants += 1;
        }
    }
    println!(
        "✓ Seeded {} products with {} variants",
        CATALOG.len(),
        seeded_variants
    );

    // --- Sales history ----------------------------------------------------
    println!();
    println!("Generating {} days of sales...", days);

    let tax_rate = TaxRate::default();
    let mut generated = 0;
    let mut consumed: Vec<i64> = vec![0; variant_ids.len()];

    for day in 0..days {
        // 1-5 sales per day, deterministic
        let sales_today = 1 + ((day * 7 + 3) % 5) as usize;

        for n in 0..sales_today {
            let seed = (day as usize) * 13 + n * 5;
            let created_at = Utc::now() - Duration::days(days - 1 - day)
                + Duration::hours(9 + (seed % 11) as i64)
                + Duration::minutes((seed * 7 % 60) as i64);

            // 1-3 distinct lines per sale
            let line_count = 1 + seed % 3;
            let mut subtotal = Money::zero();
            let mut lines: Vec<(usize, i64)> = Vec::new(); // (variant index, qty)
            for l in 0..line_count {
                let idx = (seed + l * 11) % variant_ids.len();
                if lines.iter().any(|(existing, _)| *existing == idx) {
                    continue;
                }
                let qty = 1 + ((seed + l) % 3) as i64;
                subtotal += Money::from_cents(variant_ids[idx].1) * qty;
                lines.push((idx, qty));
            }

            let tax = subtotal.calculate_tax(tax_rate);
            let total = subtotal + tax;
            let user = PROFILES[seed % PROFILES.len()].0;
            // One cancelled sale sprinkled in every ~10 days
            let status = if day % 10 == 9 && n == 0 {
                TransactionStatus::Cancelled
            } else {
                TransactionStatus::Completed
            };

            let transaction = Transaction {
                id: Uuid::new_v4().to_string(),
                user_id: user.to_string(),
                subtotal_cents: subtotal.cents(),
                tax_cents: tax.cents(),
                discount_cents: 0,
                total_cents: total.cents(),
                payment_method: PAYMENT_METHODS[seed % PAYMENT_METHODS.len()],
                status,
                notes: None,
                created_at,
                updated_at: created_at,
            };
            db.transactions().insert(&transaction).await?;

            for (idx, qty) in &lines {
                let (variant_id, price) = &variant_ids[*idx];
                let item = TransactionItem {
                    id: Uuid::new_v4().to_string(),
                    transaction_id: transaction.id.clone(),
                    variant_id: variant_id.clone(),
                    quantity: *qty,
                    unit_price_cents: *price,
                    subtotal_cents: price * qty,
                    created_at,
                };
                db.transactions().insert_item(&item).await?;

                if status == TransactionStatus::Completed {
                    db.products()
                        .decrement_stock(variant_id, *qty, created_at)
                        .await?;
                    consumed[*idx] += qty;
                }
            }

            generated += 1;
        }
    }

    // Burn the remaining headroom so stocks land on the CATALOG figures
    for (idx, (variant_id, _)) in variant_ids.iter().enumerate() {
        let leftover = 200 - consumed[idx];
        if leftover > 0 {
            db.products()
                .decrement_stock(variant_id, leftover, Utc::now())
                .await?;
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} transactions in {:?}", generated, elapsed);

    // --- Verify -----------------------------------------------------------
    println!();
    println!("Verifying...");
    let recent = db.transactions().recent_with_cashier(5).await?;
    println!("  Recent transactions: {}", recent.len());
    let low = db.products().low_stock(10).await?;
    println!("  Low-stock variants: {}", low.len());
    let categories = db.products().categories().await?;
    println!("  Categories: {}", categories.join(", "));

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
