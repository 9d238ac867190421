//! Exact decimal arithmetic for staking summaries.
//!
//! Token amounts arrive as raw base-unit integers of arbitrary size (an SPL
//! amount can exceed 2^63 once summed) and are chained through several steps:
//! raw integer, human decimal, percentage of supply, USD value. Every step
//! here is exact or rounds exactly once at the end, so no error accumulates
//! across the chain. Floating point is never used.
//!
//! # Building Blocks
//!
//! - [`TokenAmount`] - raw base units plus the token's decimal count
//! - [`scale_units`] - raw integer to decimal (`raw * 10^-decimals`)
//! - [`checked_percentage`] - `part / whole * 100`, `None` when `whole` is zero
//! - [`clamped_sub`] - subtraction floored at zero
//! - [`usd_value`] - `amount * price`
//!
//! # Rendering
//!
//! - [`format_plain`] - exact decimal, trailing zeros removed, never exponent notation
//! - [`format_fixed`] - rounded half-up to a fixed number of places
//! - [`format_percentage`] - `"25.00%"`
//! - [`format_usd`] - `"$1,234.50"`
//!
//! Rounding is half-up (ties away from zero) everywhere, matching what the
//! dashboard has always displayed.

use core::fmt;
use core::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use thiserror::Error;

/// Largest scale magnitude [`parse_decimal`] accepts.
///
/// Quotes and amounts never carry more than a few dozen fractional digits;
/// anything beyond this is treated as malformed input.
pub const MAX_DECIMAL_SCALE: i64 = 64;

/// Largest power of ten the renderers expand. Values needing more render in
/// exponent notation instead.
const MAX_RENDER_EXPONENT: u64 = 4096;

/// Numeric parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Input is not a decimal number
    #[error("invalid decimal value: {0:?}")]
    InvalidDecimal(String),
    /// Input is a decimal whose exponent is out of range
    #[error("decimal exponent out of range: {0:?}")]
    ScaleOutOfRange(String),
    /// Input is not a non-negative integer
    #[error("invalid integer amount: {0:?}")]
    InvalidAmount(String),
}

// ============================================================================
// Token Amounts
// ============================================================================

/// A raw token amount together with the decimal count that scales it.
///
/// The raw value is never modified; scaling only happens when converting to a
/// decimal or rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: BigUint,
    decimals: u8,
}

impl TokenAmount {
    /// Create a token amount from raw base units.
    pub fn new(raw: BigUint, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Create a token amount from a `u64` raw value.
    pub fn from_u64(raw: u64, decimals: u8) -> Self {
        Self::new(BigUint::from(raw), decimals)
    }

    /// Parse a raw amount as returned by RPC (`"1234500"`).
    pub fn parse_raw(raw: &str, decimals: u8) -> Result<Self, NumericError> {
        let raw = BigUint::from_str(raw.trim())
            .map_err(|_| NumericError::InvalidAmount(raw.to_string()))?;
        Ok(Self::new(raw, decimals))
    }

    /// Raw base units.
    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    /// Decimal count.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Exact decimal value (`raw * 10^-decimals`).
    pub fn to_decimal(&self) -> BigDecimal {
        scale_units(&BigInt::from(self.raw.clone()), self.decimals)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_plain(&self.to_decimal()))
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Scale a raw integer by `10^-decimals`. Exact.
pub fn scale_units(raw: &BigInt, decimals: u8) -> BigDecimal {
    BigDecimal::new(raw.clone(), i64::from(decimals))
}

/// Parse a decimal string such as a price quote (`"2.5"`, `"0.0123"`).
///
/// Thousands separators are accepted and ignored (`"1,234.5"`). Exponent
/// notation is accepted as long as the resulting scale stays within
/// [`MAX_DECIMAL_SCALE`] in either direction.
pub fn parse_decimal(value: &str) -> Result<BigDecimal, NumericError> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(NumericError::InvalidDecimal(value.to_string()));
    }
    let parsed = BigDecimal::from_str(&cleaned)
        .map_err(|_| NumericError::InvalidDecimal(value.to_string()))?;
    let (_, scale) = parsed.as_bigint_and_exponent();
    if scale.unsigned_abs() > MAX_DECIMAL_SCALE.unsigned_abs() {
        return Err(NumericError::ScaleOutOfRange(value.to_string()));
    }
    Ok(parsed)
}

/// Percentage of `part` in `whole` (`part / whole * 100`).
///
/// Returns `None` if `whole` is zero.
pub fn checked_percentage(part: &BigDecimal, whole: &BigDecimal) -> Option<BigDecimal> {
    if whole.is_zero() {
        return None;
    }
    Some((part.clone() * BigDecimal::from(100u32)) / whole.clone())
}

/// Subtraction floored at zero.
///
/// Used where a negative result has no financial meaning, e.g. a vault balance
/// that momentarily trails the rewards already resolved against it.
pub fn clamped_sub(minuend: &BigDecimal, subtrahend: &BigDecimal) -> BigDecimal {
    if minuend <= subtrahend {
        return BigDecimal::zero();
    }
    minuend - subtrahend
}

/// USD value of a token amount at a given price. Exact.
pub fn usd_value(amount: &BigDecimal, price: &BigDecimal) -> BigDecimal {
    amount * price
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a decimal exactly, without exponent notation and without trailing
/// fractional zeros (`1.500` renders as `"1.5"`, `1E+3` as `"1000"`).
pub fn format_plain(value: &BigDecimal) -> String {
    let (digits, exponent) = value.as_bigint_and_exponent();
    if exponent <= 0 {
        return match pow10(exponent.unsigned_abs()) {
            Some(factor) => render(&(digits * factor), 0, false),
            None => scientific(value),
        };
    }
    if exponent.unsigned_abs() > MAX_RENDER_EXPONENT {
        return scientific(value);
    }
    let mut rendered = render(&digits, exponent.unsigned_abs(), false);
    if rendered.contains('.') {
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
    }
    rendered
}

/// Render a decimal rounded half-up to exactly `places` fractional digits.
pub fn format_fixed(value: &BigDecimal, places: u32) -> String {
    match rescale(value, u64::from(places)) {
        Some(digits) => render(&digits, u64::from(places), false),
        None => scientific(value),
    }
}

/// Like [`format_fixed`] with thousands separators in the integer part.
pub fn format_grouped(value: &BigDecimal, places: u32) -> String {
    match rescale(value, u64::from(places)) {
        Some(digits) => render(&digits, u64::from(places), true),
        None => scientific(value),
    }
}

/// Render a percentage with two places and a `%` suffix (`"25.00%"`).
pub fn format_percentage(value: &BigDecimal) -> String {
    format!("{}%", format_fixed(value, 2))
}

/// Render a USD value with two places and thousands separators (`"$1,234.50"`).
pub fn format_usd(value: &BigDecimal) -> String {
    let rendered = format_grouped(value, 2);
    match rendered.strip_prefix('-') {
        Some(magnitude) => format!("-${magnitude}"),
        None => format!("${rendered}"),
    }
}

/// `digits` followed by `e` and the power of ten (`"1e4096"`).
fn scientific(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    format!("{digits}e{}", -i128::from(scale))
}

/// Rescale to `scale` fractional digits, rounding half-up (ties away from zero).
///
/// `None` if the shift exceeds the render limit.
fn rescale(value: &BigDecimal, scale: u64) -> Option<BigInt> {
    let (digits, exponent) = value.as_bigint_and_exponent();
    let target = i128::from(scale);
    let exponent = i128::from(exponent);

    if exponent <= target {
        let shift = u64::try_from(target - exponent).ok()?;
        return Some(digits * pow10(shift)?);
    }

    let divisor = pow10(u64::try_from(exponent - target).ok()?)?;
    let quotient = &digits / &divisor;
    let remainder = &digits % &divisor;

    let rounded = if remainder.magnitude().clone() * 2u32 >= *divisor.magnitude() {
        match digits.sign() {
            Sign::Minus => quotient - 1,
            _ => quotient + 1,
        }
    } else {
        quotient
    };
    Some(rounded)
}

/// Render `digits * 10^-scale` as a decimal string.
fn render(digits: &BigInt, scale: u64, group: bool) -> String {
    let scale = scale as usize;
    let mut text = digits.magnitude().to_string();
    if text.len() <= scale {
        text = format!("{}{}", "0".repeat(scale + 1 - text.len()), text);
    }
    let (int_part, frac_part) = text.split_at(text.len() - scale);

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 2);
    if digits.sign() == Sign::Minus {
        out.push('-');
    }
    if group {
        out.push_str(&group_thousands(int_part));
    } else {
        out.push_str(int_part);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(int_part: &str) -> String {
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn pow10(exponent: u64) -> Option<BigInt> {
    if exponent > MAX_RENDER_EXPONENT {
        return None;
    }
    let exponent = u32::try_from(exponent).ok()?;
    Some(BigInt::from(10u8).pow(exponent))
}
