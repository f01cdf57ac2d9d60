//! Numeric normalization for amounts and percentages read from documents.
//!
//! UBL producers in the wild emit values such as `" .07"` or `"19"` where
//! `"0.07"` and `"19%"` are meant. Everything numeric coming out of a
//! parsed document passes through here before it reaches the canonical
//! model, so malformed input surfaces as [`UblError::Numeric`] instead of
//! silently becoming zero.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::UblError;

/// Largest scale a [`Decimal`] can hold.
const MAX_SCALE: u32 = 28;

/// UNTDID 5305 code for zero-rated goods.
pub const ZERO_RATED_CODE: &str = "Z";

/// UNTDID 5305 code for services outside the scope of tax.
pub const OUTSIDE_SCOPE_CODE: &str = "O";

/// Trim surrounding whitespace and add a leading zero to values such as `.07`.
pub fn normalize_numeric_string(s: &str) -> String {
    let s = s.trim();
    if s.starts_with('.') {
        format!("0{s}")
    } else {
        s.to_string()
    }
}

/// Parse a document amount, keeping the scale as written (`"10.50"` stays two places).
pub fn parse_amount(s: &str) -> Result<Decimal, UblError> {
    let normalized = normalize_numeric_string(s);
    Decimal::from_str(&normalized).map_err(|e| UblError::numeric(s, e))
}

/// Parse a document percentage. A missing `%` suffix is appended first.
pub fn parse_percentage(s: &str) -> Result<Percentage, UblError> {
    let mut normalized = normalize_numeric_string(s);
    if !normalized.ends_with('%') {
        normalized.push('%');
    }
    Percentage::from_str(&normalized).map_err(|e| match e {
        UblError::Numeric { message, .. } => UblError::numeric(s, message),
        other => other,
    })
}

/// Decimal places needed to divide `price` by `base_quantity` without loss:
/// `price_decimals + ceil(log10(|base_quantity|))`, with no extra digits
/// when the base quantity is one or less.
pub fn required_precision(price: Decimal, base_quantity: Decimal) -> u32 {
    let whole = base_quantity
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let additional = if whole > Decimal::ONE {
        // ceil(log10(n)) for n > 1 equals the digit count of n - 1.
        let mut rest = whole - Decimal::ONE;
        let mut digits = 0u32;
        while rest >= Decimal::ONE {
            rest = (rest / Decimal::TEN).trunc();
            digits += 1;
        }
        digits
    } else {
        0
    };
    (price.scale() + additional).min(MAX_SCALE)
}

/// Convert a price quoted per `base_quantity` units into a unit price.
///
/// The price is rescaled up to [`required_precision`] before dividing so
/// the division itself introduces no rounding beyond that precision. A
/// zero base quantity leaves the price untouched.
pub fn divide_by_base_quantity(price: Decimal, base_quantity: Decimal) -> Result<Decimal, UblError> {
    if base_quantity.is_zero() {
        return Ok(price);
    }
    let precision = required_precision(price, base_quantity);
    let mut scaled = price;
    if scaled.scale() < precision {
        scaled.rescale(precision);
    }
    let quotient = scaled
        .checked_div(base_quantity)
        .ok_or_else(|| UblError::numeric(base_quantity.to_string(), "division overflow"))?;
    Ok(rescale_half_up(quotient, precision))
}

/// Round half away from zero to exactly `scale` decimal places.
pub fn rescale_half_up(value: Decimal, scale: u32) -> Decimal {
    let scale = scale.min(MAX_SCALE);
    let mut v = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    v.rescale(scale);
    v
}

/// Whether a percent re-derived from document text should be kept.
///
/// A `0%` rate is only meaningful for the zero-rated category; for exempt,
/// reverse-charge and similar categories it is dropped so the canonical
/// side does not classify the fragment as an ordinary zero rate.
pub fn keep_parsed_percent(percent: &Percentage, category_code: Option<&str>) -> bool {
    !percent.is_zero() || category_code == Some(ZERO_RATED_CODE)
}

/// Percentage stored in percent units (`19` means 19 %), scale preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Value in percent units.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Apply this percentage to `amount`; `None` on arithmetic overflow.
    pub fn of(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.0)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
    }

    /// Render without the `%` sign, as UBL `Percent` and `MultiplierFactorNumeric` expect.
    pub fn to_string_without_symbol(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Percentage {
    type Err = UblError;

    /// Parse `"19%"` / `"7.5 %"`. The `%` suffix is mandatory.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_suffix('%')
            .ok_or_else(|| UblError::numeric(s, "percentage must end with '%'"))?;
        let value = Decimal::from_str(body.trim()).map_err(|e| UblError::numeric(s, e))?;
        Ok(Self(value))
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Percentage::from_str(&s).map_err(serde::de::Error::custom)
    }
}
