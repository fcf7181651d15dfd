//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 16% VAT on $1.15 in floats:                                          │
//! │    1.15 × 0.16 = 0.18400000000000002 → which cent is that?              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    115 cents × 1600 bps = 18.4 cents → rounds to 18, explicitly         │
//! │    Rounding happens in exactly one place, on integer math               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(2500); // $25.00
//!
//! // Arithmetic operations
//! let line = price * 3;                      // $75.00
//! let total = line + Money::from_cents(500); // $80.00
//!
//! // NEVER do this:
//! // let bad = Money::from_float(24.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (discounts,
///   over-discounted subtotals) before the final clamp
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Variant.price_cents ──► CartItem line total ──► Cart.subtotal
///                                                     │
///        discount ◄── caller clamps to subtotal ──────┤
///                                                     ▼
///                    tax on (subtotal − discount) ──► Cart.total
///                                                     │
///                                                     ▼
///                                     Transaction.total_cents
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let price = Money::from_cents(2500); // Represents $25.00
    /// assert_eq!(price.cents(), 2500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (whole currency) portion.
    #[inline]
    pub const fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps the value to zero or above.
    ///
    /// Cart totals use this for the final `max(0, ...)` step: a discount
    /// larger than the subtotal must never produce a negative amount due.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-250).non_negative().cents(), 0);
    /// assert_eq!(Money::from_cents(250).non_negative().cents(), 250);
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates tax on this amount, rounding half up on integer math.
    ///
    /// ## Implementation
    /// `(amount_cents × bps + 5000) / 10000`: the +5000 is half of the
    /// 10000 bps divisor, so .5 cents round up. i128 intermediate prevents
    /// overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    /// use bodega_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(25000); // $250.00
    /// let rate = TaxRate::from_bps(1600);  // 16% VAT
    ///
    /// let tax = base.calculate_tax(rate);
    /// assert_eq!(tax.cents(), 4000); // $40.00
    /// ```
    ///
    /// ## Where This Runs
    /// ```text
    /// Cart subtotal: $250.00
    ///      │
    ///      ▼
    /// subtract discount ($0.00)
    ///      │
    ///      ▼
    /// calculate_tax(16%) ← THIS FUNCTION (post-discount base)
    ///      │
    ///      ▼
    /// Total: $290.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. The UI formats currency with the
/// configured symbol and locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.major_units().abs(),
            self.minor_units()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity (line totals).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(2599);
        assert_eq!(money.cents(), 2599);
        assert_eq!(money.major_units(), 25);
        assert_eq!(money.minor_units(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(2599)), "$25.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.cents(), 500);
    }

    #[test]
    fn test_vat_on_round_amount() {
        // $250.00 at 16% = $40.00 exactly
        let amount = Money::from_cents(25000);
        let tax = amount.calculate_tax(TaxRate::from_bps(1600));
        assert_eq!(tax.cents(), 4000);
    }

    #[test]
    fn test_vat_rounds_half_up() {
        // $1.15 at 16% = 18.4 cents → 18
        assert_eq!(
            Money::from_cents(115)
                .calculate_tax(TaxRate::from_bps(1600))
                .cents(),
            18
        );
        // $1.03 at 16% = 16.48 cents → 16
        assert_eq!(
            Money::from_cents(103)
                .calculate_tax(TaxRate::from_bps(1600))
                .cents(),
            16
        );
        // $0.91 at 16% = 14.56 cents → 15
        assert_eq!(
            Money::from_cents(91)
                .calculate_tax(TaxRate::from_bps(1600))
                .cents(),
            15
        );
    }

    #[test]
    fn test_tax_on_zero_base_is_zero() {
        // A fully discounted cart has a zero tax base
        let tax = Money::zero().calculate_tax(TaxRate::from_bps(1600));
        assert_eq!(tax.cents(), 0);
    }

    #[test]
    fn test_non_negative_clamp() {
        assert_eq!(Money::from_cents(-1).non_negative().cents(), 0);
        assert_eq!(Money::from_cents(0).non_negative().cents(), 0);
        assert_eq!(Money::from_cents(1).non_negative().cents(), 1);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    /// Large carts must not overflow the tax intermediate.
    #[test]
    fn test_tax_on_large_amount() {
        let amount = Money::from_cents(9_000_000_000_000); // $90 billion
        let tax = amount.calculate_tax(TaxRate::from_bps(1600));
        assert_eq!(tax.cents(), 1_440_000_000_000);
    }
}
