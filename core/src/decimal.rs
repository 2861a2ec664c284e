//! Decimal parsing and context-bound arithmetic.
//!
//! Every arithmetic step goes through a [`DecimalContext`], which rounds the
//! result to a fixed number of significant digits (half-even). The context is
//! a plain value: two evaluators with different precisions never interfere.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ConfigError, RateError};

/// Lowest precision that keeps chained averages comparable against a 1% band.
pub const MIN_PRECISION: u32 = 20;

/// `rust_decimal` carries a 96-bit mantissa, so 28 digits is the ceiling.
pub const MAX_PRECISION: u32 = 28;

pub const DEFAULT_PRECISION: u32 = MIN_PRECISION;

/// Anything that can be read as an exact base-10 value.
pub trait ToDecimal {
    fn to_decimal(&self) -> Result<Decimal, RateError>;
}

impl ToDecimal for str {
    fn to_decimal(&self) -> Result<Decimal, RateError> {
        parse_decimal(self)
    }
}

impl ToDecimal for String {
    fn to_decimal(&self) -> Result<Decimal, RateError> {
        parse_decimal(self)
    }
}

impl ToDecimal for Decimal {
    fn to_decimal(&self) -> Result<Decimal, RateError> {
        Ok(*self)
    }
}

impl<T: ToDecimal + ?Sized> ToDecimal for &T {
    fn to_decimal(&self) -> Result<Decimal, RateError> {
        (**self).to_decimal()
    }
}

/// Parses plain (`"1.1015"`) or scientific (`"1.1015e0"`) notation.
///
/// Values that cannot be held without rounding are rejected rather than
/// silently truncated.
pub fn parse_decimal(input: &str) -> Result<Decimal, RateError> {
    let trimmed = input.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str_exact(trimmed)
    };

    parsed.map_err(|_| RateError::MalformedDecimal {
        input: input.to_string(),
    })
}

pub fn parse_all<T: ToDecimal>(values: &[T]) -> Result<Vec<Decimal>, RateError> {
    values.iter().map(ToDecimal::to_decimal).collect()
}

/// Fixed significant-digit precision applied after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalContext {
    precision: u32,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl DecimalContext {
    pub fn new(precision: u32) -> Result<Self, ConfigError> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(ConfigError::PrecisionOutOfRange {
                precision,
                min: MIN_PRECISION,
                max: MAX_PRECISION,
            });
        }
        Ok(Self { precision })
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Rounds `value` down to the context's significant digits.
    ///
    /// Values that already fit are returned as-is: no trailing zeros are added,
    /// so `32.1` stays `32.1`.
    pub fn round(&self, value: Decimal) -> Result<Decimal, RateError> {
        if significant_digits(value) <= self.precision {
            return Ok(value);
        }
        value
            .round_sf_with_strategy(self.precision, RoundingStrategy::MidpointNearestEven)
            .ok_or(RateError::Overflow)
    }

    pub fn add(&self, a: Decimal, b: Decimal) -> Result<Decimal, RateError> {
        let sum = a.checked_add(b).ok_or(RateError::Overflow)?;
        self.round(sum)
    }

    pub fn sub(&self, a: Decimal, b: Decimal) -> Result<Decimal, RateError> {
        let diff = a.checked_sub(b).ok_or(RateError::Overflow)?;
        self.round(diff)
    }

    pub fn mul(&self, a: Decimal, b: Decimal) -> Result<Decimal, RateError> {
        let product = a.checked_mul(b).ok_or(RateError::Overflow)?;
        self.round(product)
    }

    pub fn div(&self, a: Decimal, b: Decimal) -> Result<Decimal, RateError> {
        if b.is_zero() {
            return Err(RateError::DivisionByZero);
        }
        let quotient = a.checked_div(b).ok_or(RateError::Overflow)?;
        self.round(quotient)
    }

    /// Arithmetic mean. An empty slice is an error, never a zero average.
    pub fn mean(&self, values: &[Decimal]) -> Result<Decimal, RateError> {
        if values.is_empty() {
            return Err(RateError::EmptyInput);
        }

        let total = values
            .iter()
            .try_fold(Decimal::ZERO, |acc, v| self.add(acc, *v))?;

        self.div(total, Decimal::from(values.len()))
    }

    pub fn midpoint(&self, a: Decimal, b: Decimal) -> Result<Decimal, RateError> {
        let sum = self.add(a, b)?;
        self.div(sum, Decimal::TWO)
    }
}

fn significant_digits(value: Decimal) -> u32 {
    value
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(0, |log| log + 1)
}

impl FromStr for DecimalContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let precision = s.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnv {
            key: "precision",
            value: s.to_string(),
        })?;
        Self::new(precision)
    }
}
