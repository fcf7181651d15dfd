//! # Dashboard Reads
//!
//! Aggregated views for the admin dashboard and the sales report. This
//! module only fetches rows and shapes responses; every calculation lives
//! in `bodega_core::reports` where it is pure and tested in isolation.
//!
//! Dashboard reads never fail: a fetch error degrades that figure to
//! zero/empty with a logged warning. A dashboard that renders zeros beats
//! an error page at the counter, and the store's own screens surface
//! connectivity problems separately.
//!
//! "Now" is always injected by the caller. Nothing in here samples the
//! clock, which keeps period math reproducible in tests.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::warn;

use bodega_core::reports::{
    self, DailySales, PaymentBreakdown, PeriodSummary, ProductSale, ReportPeriods, StockLevel,
    TopProduct, SALES_SERIES_DAYS,
};
use bodega_core::{Money, PaymentMethod, TransactionStatus, DEFAULT_MIN_STOCK};
use bodega_db::{Database, DbError, LowStockRow, RecentTransactionRow};

/// Top-seller count when the caller does not ask for a specific one.
const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Recent-transaction count when the caller does not ask for a specific one.
const DEFAULT_RECENT_LIMIT: i64 = 10;

// ============================================================================
// Response types
// ============================================================================

/// Headline figures for the dashboard cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_sales: Money,
    pub today_transactions: i64,
    pub week_sales: Money,
    pub week_transactions: i64,
    pub month_sales: Money,
    pub month_transactions: i64,
    /// Active products in the catalog.
    pub total_products: i64,
    /// Variants of active products at or below their restock threshold.
    pub low_stock_count: i64,
    /// Month-over-month sales change, rounded to a whole percent.
    pub sales_change: i64,
    /// Month-over-month transaction-count change, rounded to a whole percent.
    pub transactions_change: i64,
}

/// One row of the dashboard's latest-sales table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub id: String,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
    /// `None` when the cashier's profile no longer exists.
    pub cashier_name: Option<String>,
}

impl From<RecentTransactionRow> for RecentTransaction {
    fn from(row: RecentTransactionRow) -> Self {
        RecentTransaction {
            id: row.id,
            total: Money::from_cents(row.total_cents),
            payment_method: row.payment_method,
            status: row.status,
            created_at: row.created_at,
            item_count: row.item_count,
            cashier_name: row.cashier_name,
        }
    }
}

/// One row of the dashboard's restock list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub variant_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub sku: String,
    pub stock: i64,
    /// The threshold the variant is measured against.
    pub min_stock: i64,
    pub image_url: Option<String>,
    pub level: StockLevel,
}

impl From<LowStockRow> for LowStockItem {
    fn from(row: LowStockRow) -> Self {
        let level = StockLevel::classify(row.stock, row.min_stock);

        LowStockItem {
            variant_id: row.variant_id,
            product_name: row.product_name,
            variant_name: row.variant_name,
            sku: row.sku,
            stock: row.stock,
            min_stock: row.min_stock.unwrap_or(DEFAULT_MIN_STOCK),
            image_url: row.image_url,
            level,
        }
    }
}

/// Period summaries for the sales report screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub today: PeriodSummary,
    pub week: PeriodSummary,
    pub month: PeriodSummary,
    pub last_month: PeriodSummary,
    pub all_time: PeriodSummary,
    /// Month-over-month sales growth in percent, unrounded.
    pub month_growth: f64,
    /// Payment-method counts for the current month.
    pub payment_methods: PaymentBreakdown,
}

// ============================================================================
// Service
// ============================================================================

/// Read-side aggregations for the admin screens.
#[derive(Clone)]
pub struct DashboardService {
    db: Database,
}

impl DashboardService {
    pub fn new(db: Database) -> Self {
        DashboardService { db }
    }

    /// Headline dashboard figures at the given instant.
    pub async fn stats(&self, now: DateTime<Utc>) -> DashboardStats {
        let periods = ReportPeriods::at(now);

        // One fetch covers every bucket: completed sales since the start of
        // last month.
        let transactions = fetch_or_empty(
            self.db
                .transactions()
                .list_completed_since(periods.last_month_start)
                .await,
            "completed transactions",
        );

        let today = reports::summarize(reports::since(&transactions, periods.today_start));
        let week = reports::summarize(reports::since(&transactions, periods.week_start));
        let month = reports::summarize(reports::since(&transactions, periods.month_start));
        let last_month = reports::summarize(reports::between(
            &transactions,
            periods.last_month_start,
            periods.last_month_end,
        ));

        let total_products = match self.db.products().count_active().await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "Dashboard product count failed; reporting zero");
                0
            }
        };

        let variants = fetch_or_empty(
            self.db.products().variants_of_active_products().await,
            "active variants",
        );
        let low_stock_count = reports::low_stock_count(&variants) as i64;

        let sales_change = reports::percent_change(
            month.sales.cents() as f64,
            last_month.sales.cents() as f64,
        )
        .round() as i64;
        let transactions_change = reports::percent_change(
            month.transactions as f64,
            last_month.transactions as f64,
        )
        .round() as i64;

        DashboardStats {
            today_sales: today.sales,
            today_transactions: today.transactions,
            week_sales: week.sales,
            week_transactions: week.transactions,
            month_sales: month.sales,
            month_transactions: month.transactions,
            total_products,
            low_stock_count,
            sales_change,
            transactions_change,
        }
    }

    /// Seven calendar-day sales buckets ending at `today`.
    pub async fn sales_chart(&self, today: NaiveDate) -> Vec<DailySales> {
        let window_start = (today - Days::new(SALES_SERIES_DAYS - 1))
            .and_time(NaiveTime::MIN)
            .and_utc();

        let transactions = fetch_or_empty(
            self.db.transactions().list_completed_since(window_start).await,
            "chart transactions",
        );

        reports::sales_series(&transactions, today)
    }

    /// Top sellers by summed item revenue.
    pub async fn top_products(&self, limit: Option<usize>) -> Vec<TopProduct> {
        let rows = fetch_or_empty(
            self.db.transactions().product_sales().await,
            "product sales",
        );
        let sales: Vec<ProductSale> = rows.into_iter().map(Into::into).collect();

        reports::top_products(&sales, limit.unwrap_or(DEFAULT_TOP_PRODUCTS))
    }

    /// Latest transactions with cashier name and item count.
    pub async fn recent_transactions(&self, limit: Option<i64>) -> Vec<RecentTransaction> {
        let rows = fetch_or_empty(
            self.db
                .transactions()
                .recent_with_cashier(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
                .await,
            "recent transactions",
        );

        rows.into_iter().map(Into::into).collect()
    }

    /// Variants at or below their restock threshold, most depleted first.
    pub async fn low_stock(&self, limit: i64) -> Vec<LowStockItem> {
        let rows = fetch_or_empty(self.db.products().low_stock(limit).await, "low stock");

        rows.into_iter().map(Into::into).collect()
    }

    /// Period summaries plus payment breakdown for the report screen.
    pub async fn sales_report(&self, now: DateTime<Utc>) -> SalesReport {
        let periods = ReportPeriods::at(now);

        // The all-time summary needs the full history.
        let transactions = fetch_or_empty(
            self.db.transactions().list_completed().await,
            "completed transactions",
        );

        let today = reports::summarize(reports::since(&transactions, periods.today_start));
        let week = reports::summarize(reports::since(&transactions, periods.week_start));
        let month = reports::summarize(reports::since(&transactions, periods.month_start));
        let last_month = reports::summarize(reports::between(
            &transactions,
            periods.last_month_start,
            periods.last_month_end,
        ));
        let all_time = reports::summarize(&transactions);

        let month_growth = reports::percent_change(
            month.sales.cents() as f64,
            last_month.sales.cents() as f64,
        );
        let payment_methods =
            reports::payment_breakdown(reports::since(&transactions, periods.month_start));

        SalesReport {
            today,
            week,
            month,
            last_month,
            all_time,
            month_growth,
            payment_methods,
        }
    }
}

/// Unwraps a fetch, degrading a failure to an empty set with a warning.
fn fetch_or_empty<T>(result: Result<Vec<T>, DbError>, what: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, what, "Dashboard fetch failed; rendering empty");
            Vec::new()
        }
    }
}
