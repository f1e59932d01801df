//! Exact rational numbers and literal parsing.
//!
//! Every value handled by the engine is a `BigRational`. Literals may be
//! given as integers, `p/q` fractions, decimals or scientific notation;
//! decimal digits are read exactly, so `0.4` means `2/5` whatever the
//! number of digits or the size of the exponent. Floats are read as the
//! decimal number they print as, never as their binary approximation.

use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use rust_decimal::Decimal;

use crate::error::{ModelError, Result};

/// Exact rational number used for every payoff, mass and LP coefficient.
pub type Rational = BigRational;

/// Builds `numer / denom`.
///
/// # Panics
/// Panics if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> Rational {
    assert!(denom != 0, "rational denominator must be nonzero");
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Builds the integer `value` as a rational.
pub fn integer(value: i64) -> Rational {
    Rational::from_integer(BigInt::from(value))
}

/// Parses a numeric literal into an exact rational.
///
/// Accepted forms: `"3"`, `"-1/2"`, `"0.4"`, `".6"`, `"11e-1"`.
///
/// # Errors
/// Returns `NotARational` for malformed literals and zero denominators.
pub fn parse_rational(literal: &str) -> Result<Rational> {
    let text = literal.trim();
    let invalid = || ModelError::NotARational(literal.to_string());

    if let Some((numer, denom)) = text.split_once('/') {
        let numer = BigInt::from_str(numer.trim()).map_err(|_| invalid())?;
        let denom = BigInt::from_str(denom.trim()).map_err(|_| invalid())?;
        if denom.is_zero() {
            return Err(invalid());
        }
        return Ok(Rational::new(numer, denom));
    }

    parse_scientific(text).ok_or_else(invalid)
}

/// `[sign] digits [. digits] [(e|E) [sign] digits]` as
/// `digits · 10^(exponent - fraction digits)`.
fn parse_scientific(text: &str) -> Option<Rational> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(position) => (&text[..position], text[position + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    let numer = BigInt::from_str(&format!("{whole}{fraction}")).ok()?;
    let scale = exponent.checked_sub(i64::try_from(fraction.len()).ok()?)?;
    let power: BigInt = num_traits::pow(BigInt::from(10), usize::try_from(scale.unsigned_abs()).ok()?);
    let value = if scale >= 0 {
        Rational::from_integer(numer * power)
    } else {
        Rational::new(numer, power)
    };
    Some(if negative { -value } else { value })
}

/// Lifts a decimal to the rational `mantissa / 10^scale`.
pub fn decimal_to_rational(value: &Decimal) -> Rational {
    let denom: BigInt = num_traits::pow(BigInt::from(10), value.scale() as usize);
    Rational::new(BigInt::from(value.mantissa()), denom)
}

/// Conversion of literal-like values into exact rationals.
pub trait ToRational {
    /// Converts the value.
    ///
    /// # Errors
    /// Returns `NotARational` when the value has no exact rational reading.
    fn to_rational(&self) -> Result<Rational>;
}

impl ToRational for Rational {
    fn to_rational(&self) -> Result<Rational> {
        Ok(self.clone())
    }
}

impl ToRational for i32 {
    fn to_rational(&self) -> Result<Rational> {
        Ok(integer(i64::from(*self)))
    }
}

impl ToRational for i64 {
    fn to_rational(&self) -> Result<Rational> {
        Ok(integer(*self))
    }
}

impl ToRational for u32 {
    fn to_rational(&self) -> Result<Rational> {
        Ok(integer(i64::from(*self)))
    }
}

impl ToRational for u64 {
    fn to_rational(&self) -> Result<Rational> {
        Ok(Rational::from_integer(BigInt::from(*self)))
    }
}

impl ToRational for f64 {
    fn to_rational(&self) -> Result<Rational> {
        if !self.is_finite() {
            return Err(ModelError::NotARational(self.to_string()));
        }
        // Display yields the shortest literal that round-trips
        parse_rational(&self.to_string())
    }
}

impl ToRational for Decimal {
    fn to_rational(&self) -> Result<Rational> {
        Ok(decimal_to_rational(self))
    }
}

impl ToRational for str {
    fn to_rational(&self) -> Result<Rational> {
        parse_rational(self)
    }
}

impl ToRational for String {
    fn to_rational(&self) -> Result<Rational> {
        parse_rational(self)
    }
}

impl<T: ToRational + ?Sized> ToRational for &T {
    fn to_rational(&self) -> Result<Rational> {
        (**self).to_rational()
    }
}
