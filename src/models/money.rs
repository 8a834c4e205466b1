//! Money type for transaction values and balances
//!
//! Amounts are stored as integer cents so that summing a ledger never drifts.
//! Transaction values are always positive; only a [`super::Balance`] total
//! can go negative.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use thiserror::Error;

/// A monetary amount stored as cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount a single transaction may carry ($99,999,999,999.99)
    pub const MAX_VALUE: Money = Money(9_999_999_999_999);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use tally_cli::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// assert_eq!(amount.to_string(), "$10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    ///
    /// # Panics
    ///
    /// Panics if `units * 100` does not fit in an `i64`.
    pub const fn from_units(units: i64) -> Self {
        match units.checked_mul(100) {
            Some(cents) => Self(cents),
            None => panic!("Money::from_units overflow"),
        }
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Parse an amount typed by a user or read from a CSV cell
    ///
    /// Accepts "5000", "5000.5", "1,200.00", "$12.99" and a leading minus.
    /// More than two decimal places is rejected rather than rounded, and so
    /// is anything beyond [`Money::MAX_VALUE`] in either direction.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let digits: String = rest.chars().filter(|c| *c != ',').collect();

        let invalid = || MoneyParseError::InvalidFormat(trimmed.to_string());

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits.as_str(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(trimmed.to_string()));
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            // Only digits remain, so the parse can fail only on overflow
            whole
                .parse()
                .map_err(|_| MoneyParseError::TooLarge(trimmed.to_string()))?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .ok_or_else(|| MoneyParseError::TooLarge(trimmed.to_string()))?;
        if total > Self::MAX_VALUE.0 {
            return Err(MoneyParseError::TooLarge(trimmed.to_string()));
        }

        Ok(Self(if negative { -total } else { total }))
    }

    /// Format with a caller-chosen currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid money format: {0}")]
    InvalidFormat(String),
    #[error("more than two decimal places: {0}")]
    TooPrecise(String),
    #[error("amount too large: {0}")]
    TooLarge(String),
}
