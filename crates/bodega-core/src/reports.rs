//! # Report Math
//!
//! Pure aggregation over already-fetched rows: period bucketing, percentage
//! deltas, top sellers, low-stock classification, and the 7-day sales series
//! behind the admin dashboard.
//!
//! ## Design Notes
//! Nothing here samples the clock or touches the store. "Now" and "today"
//! are parameters, which keeps every boundary case (week rollover, January,
//! leap days) testable with fixed dates. The service layer fetches rows and
//! delegates; these functions never see a connection.
//!
//! ## Period Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Periods derived from "now"                           │
//! │                                                                         │
//! │    last_month_start      month_start     week_start  today_start  now   │
//! │          │                    │               │           │        │    │
//! │  ────────▼────────────────────▼───────────────▼───────────▼────────▼──  │
//! │          ├── last month ──────┤                                         │
//! │          │   [start, end)     ├────────── this month ──────────────►    │
//! │          │                                    ├──── week (Mon) ────►    │
//! │          │                                                ├─ today ─►   │
//! │                                                                         │
//! │  All ranges are half-open [start, end); "end = now" ranges are open.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Transaction, Variant};

// =============================================================================
// Period Boundaries
// =============================================================================

/// Reporting period boundaries derived from a single "now" instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriods {
    /// Midnight at the start of the current day.
    pub today_start: DateTime<Utc>,
    /// Midnight on the Monday of the current week.
    pub week_start: DateTime<Utc>,
    /// Midnight on the first day of the current month.
    pub month_start: DateTime<Utc>,
    /// Midnight on the first day of the previous month.
    pub last_month_start: DateTime<Utc>,
    /// Exclusive end of the previous month (== month_start).
    pub last_month_end: DateTime<Utc>,
}

impl ReportPeriods {
    /// Computes all period boundaries for the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        let month_first = first_of_month(today);
        let last_month_first = month_first
            .checked_sub_months(Months::new(1))
            .expect("report dates stay within the chrono range");

        let month_start = day_start(month_first);
        ReportPeriods {
            today_start: day_start(today),
            week_start: day_start(monday),
            month_start,
            last_month_start: day_start(last_month_first),
            last_month_end: month_start,
        }
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}

/// Filters transactions whose `created_at` falls in `[start, end)`.
pub fn between<'a>(
    transactions: &'a [Transaction],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.created_at >= start && t.created_at < end)
        .collect()
}

/// Filters transactions whose `created_at` is at or after `start`.
pub fn since<'a>(transactions: &'a [Transaction], start: DateTime<Utc>) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.created_at >= start)
        .collect()
}

// =============================================================================
// Period Summary
// =============================================================================

/// Sales figure and transaction count for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodSummary {
    pub sales: Money,
    pub transactions: i64,
}

/// Sums totals and counts rows for one period's transactions.
pub fn summarize<'a, I>(transactions: I) -> PeriodSummary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut sales = Money::zero();
    let mut count = 0;
    for t in transactions {
        sales += t.total();
        count += 1;
    }
    PeriodSummary {
        sales,
        transactions: count,
    }
}

// =============================================================================
// Percentage Change
// =============================================================================

/// Month-over-month style delta: `(current − previous) / previous × 100`.
///
/// Defined as 0 when `previous` is 0 - a store with no sales last month has
/// "no change", not an infinite increase. Callers round for display.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

// =============================================================================
// Top Products
// =============================================================================

/// One sold line attributed to its product, as fetched from the store
/// (transaction item joined to variant and product).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSale {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub quantity: i64,
    pub subtotal: Money,
}

/// A product ranked by summed revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    /// Units sold across all matching lines.
    pub total_sold: i64,
    /// Summed line subtotals.
    pub total_revenue: Money,
}

/// Groups sold lines by product, sums quantity and revenue, and returns the
/// top `limit` products by revenue.
///
/// The sort is stable: products with equal revenue keep their first-seen
/// order from the input.
pub fn top_products(sales: &[ProductSale], limit: usize) -> Vec<TopProduct> {
    let mut ranked: Vec<TopProduct> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sale in sales {
        match index.get(&sale.product_id) {
            Some(&i) => {
                ranked[i].total_sold += sale.quantity;
                ranked[i].total_revenue += sale.subtotal;
            }
            None => {
                index.insert(sale.product_id.clone(), ranked.len());
                ranked.push(TopProduct {
                    product_id: sale.product_id.clone(),
                    name: sale.product_name.clone(),
                    image_url: sale.product_image.clone(),
                    total_sold: sale.quantity,
                    total_revenue: sale.subtotal,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Stock Levels
// =============================================================================

/// Inventory health of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// Above the low-stock threshold.
    Healthy,
    /// At or below the threshold but still on hand.
    Low,
    /// Nothing on hand.
    Critical,
}

impl StockLevel {
    /// Classifies a stock count against a threshold
    /// (`None` falls back to [`crate::DEFAULT_MIN_STOCK`]).
    pub fn classify(stock: i64, min_stock: Option<i64>) -> StockLevel {
        if stock <= 0 {
            return StockLevel::Critical;
        }
        if stock <= min_stock.unwrap_or(crate::DEFAULT_MIN_STOCK) {
            return StockLevel::Low;
        }
        StockLevel::Healthy
    }
}

/// Classifies a variant's inventory health.
#[inline]
pub fn stock_level(variant: &Variant) -> StockLevel {
    StockLevel::classify(variant.stock, variant.min_stock)
}

/// Whether a variant needs restocking (Low or Critical).
#[inline]
pub fn is_low_stock(variant: &Variant) -> bool {
    stock_level(variant) != StockLevel::Healthy
}

/// Counts variants at or below their low-stock threshold.
pub fn low_stock_count(variants: &[Variant]) -> usize {
    variants.iter().filter(|v| is_low_stock(v)).count()
}

// =============================================================================
// Sales Series
// =============================================================================

/// Sales accumulated for one calendar day of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub sales: Money,
    pub transactions: i64,
}

/// Number of days the dashboard sales chart covers.
pub const SALES_SERIES_DAYS: u64 = 7;

/// Builds exactly seven calendar-day buckets ending at `today` and
/// accumulates transactions into them by exact date match.
///
/// Buckets outside the window are never created; transactions outside it
/// are ignored. Empty days stay at zero so the chart has a fixed width.
pub fn sales_series(transactions: &[Transaction], today: NaiveDate) -> Vec<DailySales> {
    let start = today - Days::new(SALES_SERIES_DAYS - 1);
    let mut series: Vec<DailySales> = (0..SALES_SERIES_DAYS)
        .map(|offset| DailySales {
            date: start + Days::new(offset),
            sales: Money::zero(),
            transactions: 0,
        })
        .collect();

    for t in transactions {
        let date = t.created_at.date_naive();
        let offset = (date - start).num_days();
        if (0..SALES_SERIES_DAYS as i64).contains(&offset) {
            let bucket = &mut series[offset as usize];
            bucket.sales += t.total();
            bucket.transactions += 1;
        }
    }

    series
}

// =============================================================================
// Payment Breakdown
// =============================================================================

/// Transaction counts per payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub cash: i64,
    pub card: i64,
    pub transfer: i64,
}

/// Counts transactions by payment method.
pub fn payment_breakdown<'a, I>(transactions: I) -> PaymentBreakdown
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut breakdown = PaymentBreakdown::default();
    for t in transactions {
        match t.payment_method {
            PaymentMethod::Cash => breakdown.cash += 1,
            PaymentMethod::Card => breakdown.card += 1,
            PaymentMethod::Transfer => breakdown.transfer += 1,
        }
    }
    breakdown
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;
    use chrono::TimeZone;

    fn tx_at(created_at: DateTime<Utc>, total_cents: i64) -> Transaction {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            subtotal_cents: total_cents,
            tax_cents: 0,
            discount_cents: 0,
            total_cents,
            payment_method: PaymentMethod::Cash,
            status: TransactionStatus::Completed,
            notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn sale(product_id: &str, quantity: i64, subtotal_cents: i64) -> ProductSale {
        ProductSale {
            product_id: product_id.to_string(),
            product_name: format!("Product {}", product_id),
            product_image: None,
            quantity,
            subtotal: Money::from_cents(subtotal_cents),
        }
    }

    #[test]
    fn test_periods_midweek() {
        // Wednesday 2024-05-15
        let periods = ReportPeriods::at(utc(2024, 5, 15, 10, 30));

        assert_eq!(periods.today_start, utc(2024, 5, 15, 0, 0));
        assert_eq!(periods.week_start, utc(2024, 5, 13, 0, 0)); // Monday
        assert_eq!(periods.month_start, utc(2024, 5, 1, 0, 0));
        assert_eq!(periods.last_month_start, utc(2024, 4, 1, 0, 0));
        assert_eq!(periods.last_month_end, utc(2024, 5, 1, 0, 0));
    }

    #[test]
    fn test_periods_on_a_monday() {
        // Monday 2024-05-13: week starts today
        let periods = ReportPeriods::at(utc(2024, 5, 13, 0, 0));
        assert_eq!(periods.week_start, periods.today_start);
    }

    #[test]
    fn test_periods_in_january() {
        let periods = ReportPeriods::at(utc(2024, 1, 10, 8, 0));
        assert_eq!(periods.month_start, utc(2024, 1, 1, 0, 0));
        assert_eq!(periods.last_month_start, utc(2023, 12, 1, 0, 0));
        assert_eq!(periods.last_month_end, utc(2024, 1, 1, 0, 0));
    }

    #[test]
    fn test_week_crossing_month_boundary() {
        // Saturday 2024-06-01: the Monday of that week is 2024-05-27
        let periods = ReportPeriods::at(utc(2024, 6, 1, 12, 0));
        assert_eq!(periods.week_start, utc(2024, 5, 27, 0, 0));
        assert_eq!(periods.month_start, utc(2024, 6, 1, 0, 0));
    }

    #[test]
    fn test_between_is_half_open() {
        let start = utc(2024, 4, 1, 0, 0);
        let end = utc(2024, 5, 1, 0, 0);
        let txs = vec![
            tx_at(start, 100),                   // included: on start
            tx_at(utc(2024, 4, 15, 12, 0), 200), // included
            tx_at(end, 400),                     // excluded: on end
            tx_at(utc(2024, 3, 31, 23, 59), 800), // excluded: before start
        ];

        let in_range = between(&txs, start, end);
        let summary = summarize(in_range.into_iter());
        assert_eq!(summary.sales.cents(), 300);
        assert_eq!(summary.transactions, 2);
    }

    #[test]
    fn test_since_includes_boundary() {
        let start = utc(2024, 5, 1, 0, 0);
        let txs = vec![
            tx_at(start, 100),
            tx_at(utc(2024, 4, 30, 23, 59), 200),
        ];
        assert_eq!(since(&txs, start).len(), 1);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_percent_change_zero_previous_guard() {
        // No sales last month → 0, never infinity/NaN
        assert_eq!(percent_change(100.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_top_products_groups_and_ranks() {
        let sales = vec![
            sale("a", 2, 2000),
            sale("b", 1, 5000),
            sale("a", 3, 3000),
            sale("c", 10, 1000),
        ];

        let top = top_products(&sales, 5);
        assert_eq!(top.len(), 3);
        // a: 5000 revenue (5 units), b: 5000, c: 1000
        // a and b tie on revenue; a was seen first and stays first
        assert_eq!(top[0].product_id, "a");
        assert_eq!(top[0].total_sold, 5);
        assert_eq!(top[0].total_revenue.cents(), 5000);
        assert_eq!(top[1].product_id, "b");
        assert_eq!(top[2].product_id, "c");
    }

    #[test]
    fn test_top_products_truncates_to_limit() {
        let sales = vec![
            sale("a", 1, 400),
            sale("b", 1, 300),
            sale("c", 1, 200),
            sale("d", 1, 100),
        ];
        let top = top_products(&sales, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, "a");
        assert_eq!(top[1].product_id, "b");
    }

    #[test]
    fn test_stock_level_boundaries() {
        // Explicit threshold
        assert_eq!(StockLevel::classify(5, Some(5)), StockLevel::Low);
        assert_eq!(StockLevel::classify(6, Some(5)), StockLevel::Healthy);
        assert_eq!(StockLevel::classify(0, Some(5)), StockLevel::Critical);

        // Default threshold of 5 when min_stock is absent
        assert_eq!(StockLevel::classify(5, None), StockLevel::Low);
        assert_eq!(StockLevel::classify(6, None), StockLevel::Healthy);

        // Critical wins even when the threshold is zero
        assert_eq!(StockLevel::classify(0, Some(0)), StockLevel::Critical);
    }

    #[test]
    fn test_sales_series_buckets() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let txs = vec![
            tx_at(utc(2024, 5, 15, 9, 0), 3000),  // today
            tx_at(utc(2024, 5, 12, 18, 0), 7000), // 3 days ago
            tx_at(utc(2024, 5, 7, 12, 0), 9999),  // 8 days ago: outside
        ];

        let series = sales_series(&txs, today);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        assert_eq!(series[6].date, today);

        let non_zero: Vec<&DailySales> =
            series.iter().filter(|d| d.sales.cents() > 0).collect();
        assert_eq!(non_zero.len(), 2);
        let sum: i64 = series.iter().map(|d| d.sales.cents()).sum();
        assert_eq!(sum, 10000);

        assert_eq!(series[3].sales.cents(), 7000); // 2024-05-12
        assert_eq!(series[3].transactions, 1);
        assert_eq!(series[6].sales.cents(), 3000);
    }

    #[test]
    fn test_sales_series_empty_input_is_all_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let series = sales_series(&[], today);
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|d| d.sales.is_zero() && d.transactions == 0));
    }

    #[test]
    fn test_payment_breakdown_counts() {
        let mut txs = vec![
            tx_at(utc(2024, 5, 1, 10, 0), 100),
            tx_at(utc(2024, 5, 2, 10, 0), 100),
            tx_at(utc(2024, 5, 3, 10, 0), 100),
        ];
        txs[1].payment_method = PaymentMethod::Card;
        txs[2].payment_method = PaymentMethod::Cash;

        let breakdown = payment_breakdown(txs.iter());
        assert_eq!(breakdown.cash, 2);
        assert_eq!(breakdown.card, 1);
        assert_eq!(breakdown.transfer, 0);
    }

    #[test]
    fn test_summarize_empty_is_zero() {
        let summary = summarize(std::iter::empty());
        assert_eq!(summary.sales, Money::zero());
        assert_eq!(summary.transactions, 0);
    }
}
