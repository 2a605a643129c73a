//! # Money Module
//!
//! The `Money` type used for every amount the shop handles: repair
//! estimates, advances, balances, sale totals and expenditures.
//!
//! ## Integer Paise
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Amounts are stored as a whole number of paise (1/100 rupee).          │
//! │                                                                         │
//! │    Rs. 1000.00  ──►  Money(100_000)                                    │
//! │                                                                         │
//! │  Revenue is the sum of thousands of advances, balances and sales.      │
//! │  Integer addition never drifts, so today's total, the trend series     │
//! │  and the period total always agree to the paisa.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fixit_core::money::Money;
//!
//! let estimate = Money::from_paise(100_000); // Rs. 1000.00
//! let advance = Money::from_paise(30_000);   // Rs. 300.00
//! assert_eq!((estimate - advance).paise(), 70_000);
//!
//! let unit_price = Money::from_rupees(150);
//! assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_rupees(450)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise.
///
/// ## Design Decisions
/// - **i64 (signed)**: a balance can go negative when the advance exceeds
///   the estimate, and profit is negative on a slow day
/// - **Tuple struct**: serializes as a bare integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use fixit_core::money::Money;
    ///
    /// let price = Money::from_paise(1099); // Rs. 10.99
    /// assert_eq!(price.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Creates a Money value from a nullable column.
    ///
    /// A missing amount is zero, never a fault.
    #[inline]
    pub fn from_optional(paise: Option<i64>) -> Self {
        Money(paise.unwrap_or(0))
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, or `None` if the product
    /// does not fit in an i64.
    ///
    /// ## Example
    /// ```rust
    /// use fixit_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(15_000); // Rs. 150.00
    /// let total = unit_price.checked_multiply_quantity(3).unwrap();
    /// assert_eq!(total.paise(), 45_000);          // Rs. 450.00
    ///
    /// assert_eq!(Money::from_paise(i64::MAX / 2).checked_multiply_quantity(3), None);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Sale: Tempered Glass Rs. 150.00
    /// Quantity: 3
    ///      │
    ///      ▼
    /// checked_multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// total_price: Rs. 450.00 (stored on the sale row)
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// `self - other`, or `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way the shop's invoices print it: `Rs. 1000.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}Rs. {}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(100_000).to_string(), "Rs. 1000.00");
        assert_eq!(Money::from_paise(505).to_string(), "Rs. 5.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-Rs. 5.50");
        assert_eq!(Money::zero().to_string(), "Rs. 0.00");
    }

    #[test]
    fn test_missing_amount_is_zero() {
        assert_eq!(Money::from_optional(None), Money::zero());
        assert_eq!(Money::from_optional(Some(250)).paise(), 250);
    }

    #[test]
    fn test_sum_of_many_small_amounts_is_exact() {
        // 0.10 + 0.20 a thousand times over, the classic float drift case
        let amounts: Vec<Money> = (0..1000)
            .flat_map(|_| [Money::from_paise(10), Money::from_paise(20)])
            .collect();
        let total = amounts.iter().fold(Money::zero(), |acc, m| acc + *m);
        assert_eq!(total, Money::from_rupees(300));
    }

    #[test]
    fn test_quantity_overflow_is_none() {
        let unit_price = Money::from_paise(i64::MAX / 2);
        assert_eq!(unit_price.checked_multiply_quantity(2), Some(Money::from_paise(i64::MAX - 1)));
        assert_eq!(unit_price.checked_multiply_quantity(3), None);
        assert_eq!(Money::from_paise(i64::MIN).checked_sub(Money::from_paise(1)), None);
    }

    #[test]
    fn test_negative_balance_is_representable() {
        let estimate = Money::from_rupees(500);
        let advance = Money::from_rupees(800);
        let balance = estimate - advance;
        assert!(balance.is_negative());
        assert_eq!(-balance, Money::from_rupees(300));
    }
}
