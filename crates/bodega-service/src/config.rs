//! # Store Configuration
//!
//! Configuration loaded at startup from environment variables with fallback
//! to defaults. Read-only after initialization, so no synchronization is
//! needed; the host app holds one instance.

use serde::{Deserialize, Serialize};

use bodega_core::{TaxRate, DEFAULT_TAX_RATE_BPS};

/// Store configuration.
///
/// ## Fields
/// Defaults suit a development setup; deployments override via `BODEGA_*`
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfig {
    /// Store name (displayed in the header and on receipts)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Tax rate in basis points
    /// e.g., 1600 = 16% VAT
    pub tax_rate_bps: u32,

    /// Closing line printed on receipts
    pub receipt_footer: String,
}

impl Default for PosConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Bodega POS"
    /// - Currency: MXN ($)
    /// - Tax: 16% VAT
    fn default() -> Self {
        PosConfig {
            store_name: "Bodega POS".to_string(),
            currency_code: "MXN".to_string(),
            currency_symbol: "$".to_string(),
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            receipt_footer: "¡Gracias por su compra!".to_string(),
        }
    }
}

impl PosConfig {
    /// Creates a PosConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `BODEGA_STORE_NAME`: Override store name
    /// - `BODEGA_CURRENCY_CODE`: Override currency code
    /// - `BODEGA_CURRENCY_SYMBOL`: Override currency symbol
    /// - `BODEGA_TAX_RATE`: Override tax rate as a percentage (e.g., "16")
    /// - `BODEGA_RECEIPT_FOOTER`: Override receipt footer
    pub fn from_env() -> Self {
        let mut config = PosConfig::default();

        if let Ok(store_name) = std::env::var("BODEGA_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(currency_code) = std::env::var("BODEGA_CURRENCY_CODE") {
            config.currency_code = currency_code;
        }

        if let Ok(currency_symbol) = std::env::var("BODEGA_CURRENCY_SYMBOL") {
            config.currency_symbol = currency_symbol;
        }

        if let Ok(tax_rate_str) = std::env::var("BODEGA_TAX_RATE") {
            if let Ok(rate) = tax_rate_str.parse::<f64>() {
                config.tax_rate_bps = (rate * 100.0) as u32;
            }
        }

        if let Ok(receipt_footer) = std::env::var("BODEGA_RECEIPT_FOOTER") {
            config.receipt_footer = receipt_footer;
        }

        config
    }

    /// The configured tax rate as the core type carts are built with.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let whole = (cents / 100).abs();
        let frac = (cents % 100).abs();

        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            whole,
            frac
        )
    }
}
