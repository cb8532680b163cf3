// types/src/decimal.rs
//! Non-negative fixed-point numbers with an explicit decimal-place count.
//!
//! RRC-20 amounts are decimal string literals whose written precision is
//! protocol-relevant: the `max` literal of a deploy fixes the token's
//! precision, and later amounts may not be written with more fractional
//! digits than that. `Decimal` therefore keeps the scale it was parsed
//! with instead of normalizing it away.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing a decimal literal or from ledger arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("empty decimal literal")]
    Empty,
    #[error("invalid character {0:?} in decimal literal")]
    InvalidCharacter(char),
    #[error("more than one decimal point")]
    MultipleDots,
    #[error("decimal literal has no digits")]
    NoDigits,
    #[error("subtraction would be negative")]
    Negative,
    #[error("division by zero")]
    DivisionByZero,
}

/// An unbounded non-negative magnitude scaled by a power of ten.
///
/// Equality and ordering compare numeric value, so `1.50 == 1.5`
/// even though the two carry different scales.
#[derive(Debug, Clone, Default)]
pub struct Decimal {
    value: BigUint,
    scale: u32,
}

impl Decimal {
    /// Zero with scale 0.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Parse a literal consisting of digits and at most one dot.
    ///
    /// Signs, exponents and any other character are rejected, as are
    /// literals without a single digit. The returned value records the
    /// number of fractional digits exactly as written (`"100.00"`
    /// parses with scale 2).
    pub fn parse(literal: &str) -> Result<Self, DecimalError> {
        if literal.is_empty() {
            return Err(DecimalError::Empty);
        }
        let mut digits = String::with_capacity(literal.len());
        let mut scale: Option<u32> = None;
        for c in literal.chars() {
            match c {
                '0'..='9' => {
                    digits.push(c);
                    if let Some(fractional) = scale.as_mut() {
                        *fractional += 1;
                    }
                }
                '.' => {
                    if scale.is_some() {
                        return Err(DecimalError::MultipleDots);
                    }
                    scale = Some(0);
                }
                other => return Err(DecimalError::InvalidCharacter(other)),
            }
        }
        let value =
            BigUint::parse_bytes(digits.as_bytes(), 10).ok_or(DecimalError::NoDigits)?;
        Ok(Self {
            value,
            scale: scale.unwrap_or(0),
        })
    }

    /// The number of fractional digits this value was written with.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// 0 for zero, 1 otherwise. The type admits no negative values.
    pub fn sign(&self) -> i8 {
        if self.value.is_zero() {
            0
        } else {
            1
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self { value: a + b, scale }
    }

    /// Subtraction, erroring when the result would go below zero.
    pub fn sub(&self, other: &Self) -> Result<Self, DecimalError> {
        let (a, b, scale) = self.aligned(other);
        if b > a {
            return Err(DecimalError::Negative);
        }
        Ok(Self { value: a - b, scale })
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self {
            value: &self.value * &other.value,
            scale: self.scale + other.scale,
        }
    }

    /// Truncating division at the wider of the two scales.
    pub fn div(&self, other: &Self) -> Result<Self, DecimalError> {
        if other.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        let scale = self.scale.max(other.scale);
        let numerator = &self.value * pow10(scale + other.scale - self.scale);
        Ok(Self {
            value: numerator / &other.value,
            scale,
        })
    }

    /// Parts-per-million of `self` relative to `max`, clamped to 1_000_000
    /// once `self >= max`. Zero when `max` is zero.
    pub fn ppm_of(&self, max: &Self) -> u32 {
        if max.is_zero() {
            return 0;
        }
        let (value, max_value, _) = self.aligned(max);
        if value >= max_value {
            return 1_000_000;
        }
        let ppm = value * 1_000_000u32 / max_value;
        // value < max_value, so the quotient is below 1_000_000
        u32::try_from(ppm).unwrap_or(1_000_000)
    }

    fn aligned(&self, other: &Self) -> (BigUint, BigUint, u32) {
        let scale = self.scale.max(other.scale);
        let a = &self.value * pow10(scale - self.scale);
        let b = &other.value * pow10(scale - other.scale);
        (a, b, scale)
    }
}

fn pow10(exponent: u32) -> BigUint {
    BigUint::from(10u32).pow(exponent)
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    /// Canonical form: no leading zeros, trailing fractional zeros
    /// trimmed, the dot dropped when no fractional part remains.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.value.to_string();
        if self.scale == 0 {
            return f.write_str(&digits);
        }
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            f.write_str(int_part)
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        Self::parse(&literal).map_err(D::Error::custom)
    }
}
