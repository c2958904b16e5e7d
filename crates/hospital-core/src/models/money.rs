//! Fixed-point monetary amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Total significant digits allowed in an amount.
pub const MAX_DIGITS: u32 = 10;
/// Digits after the decimal point.
pub const DECIMAL_PLACES: u32 = 2;

/// Reasons an amount is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Enter a number.")]
    Invalid,

    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,

    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimalPlaces,

    #[error("Ensure that there are no more than 8 digits before the decimal point.")]
    TooManyDigits,
}

/// A non-negative amount with two decimal places.
///
/// The inner value always has scale 2, so its mantissa is the amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Check an amount against the field's range and precision.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_zero() {
            return Ok(Money(Decimal::new(0, DECIMAL_PLACES)));
        }
        if amount.is_sign_negative() {
            return Err(MoneyError::Negative);
        }

        let mut amount = amount.normalize();
        if amount.scale() > DECIMAL_PLACES {
            return Err(MoneyError::TooManyDecimalPlaces);
        }
        let limit = Decimal::from(10_i64.pow(MAX_DIGITS - DECIMAL_PLACES));
        if amount.trunc() >= limit {
            return Err(MoneyError::TooManyDigits);
        }

        amount.rescale(DECIMAL_PLACES);
        Ok(Money(amount))
    }

    /// Build from whole cents, as stored.
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::new(cents, DECIMAL_PLACES))
    }

    pub fn cents(&self) -> i64 {
        // Scale is fixed at 2 and the value is below 10^10 cents.
        self.0.mantissa() as i64
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Money::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str_exact(s.trim()).map_err(|_| MoneyError::Invalid)?;
        Money::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
