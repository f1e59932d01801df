//! Rational-valued functions on a finite set of states.
//!
//! `RationalFunction` is the shared mapping underneath gambles, rays and
//! mass functions. On its own it behaves like a partial function: reading
//! outside the domain is an error, and pointwise operations keep only the
//! states both operands are defined on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::Zero;
use serde::Serialize;

use super::State;
use super::rational::{Rational, ToRational};
use crate::error::{ModelError, Result};

/// Immutable map from states to exact rationals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RationalFunction<S> {
    values: BTreeMap<S, Rational>,
}

impl<S: State> RationalFunction<S> {
    /// Wraps an existing map.
    pub const fn new(values: BTreeMap<S, Rational>) -> Self {
        Self { values }
    }

    /// Builds a function from literal-like values.
    ///
    /// # Errors
    /// Returns `NotARational` if any value fails to convert.
    pub fn try_from_values<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        V: ToRational,
    {
        values
            .into_iter()
            .map(|(state, value)| value.to_rational().map(|value| (state, value)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Self::new)
    }

    /// Value at `state`.
    ///
    /// # Errors
    /// Returns `KeyMissing` when `state` is outside the domain.
    pub fn get(&self, state: &S) -> Result<&Rational> {
        self.values
            .get(state)
            .ok_or_else(|| ModelError::KeyMissing(format!("{state:?}")))
    }

    /// Value at `state`, if defined.
    pub fn value(&self, state: &S) -> Option<&Rational> {
        self.values.get(state)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.values.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Rational)> {
        self.values.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Rational> {
        self.values.values()
    }

    /// States on which the function is defined.
    pub fn domain(&self) -> BTreeSet<S> {
        self.values.keys().cloned().collect()
    }

    /// Set of values taken.
    pub fn range(&self) -> BTreeSet<Rational> {
        self.values.values().cloned().collect()
    }

    /// States with a nonzero value.
    pub fn support(&self) -> BTreeSet<S> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|(state, _)| state.clone())
            .collect()
    }

    /// Applies `op` to every value.
    pub fn map_values(&self, op: impl Fn(&Rational) -> Rational) -> Self {
        Self::new(
            self.values
                .iter()
                .map(|(state, value)| (state.clone(), op(value)))
                .collect(),
        )
    }

    /// Scalar multiple.
    pub fn scale(&self, factor: &Rational) -> Self {
        self.map_values(|value| value * factor)
    }

    /// Adds `offset` to every value in the domain.
    pub fn shifted(&self, offset: &Rational) -> Self {
        self.map_values(|value| value + offset)
    }

    /// Scalar division.
    ///
    /// # Errors
    /// Returns `DivisionByZero` when `divisor` is zero.
    pub fn checked_div(&self, divisor: &Rational) -> Result<Self> {
        if divisor.is_zero() {
            return Err(ModelError::DivisionByZero);
        }
        Ok(self.map_values(|value| value / divisor))
    }

    /// Sum of all values.
    pub fn total(&self) -> Rational {
        self.values.values().fold(Rational::zero(), |acc, value| acc + value)
    }

    /// Pointwise `op` over the states both functions are defined on.
    pub fn zip_intersection(
        &self,
        other: &Self,
        op: impl Fn(&Rational, &Rational) -> Rational,
    ) -> Self {
        Self::new(
            self.values
                .iter()
                .filter_map(|(state, left)| {
                    other
                        .values
                        .get(state)
                        .map(|right| (state.clone(), op(left, right)))
                })
                .collect(),
        )
    }

    /// Pointwise `op` over the union of domains, reading missing values as zero.
    pub fn zip_union(
        &self,
        other: &Self,
        op: impl Fn(&Rational, &Rational) -> Rational,
    ) -> Self {
        let zero = Rational::zero();
        let states: BTreeSet<&S> = self.values.keys().chain(other.values.keys()).collect();
        Self::new(
            states
                .into_iter()
                .map(|state| {
                    let left = self.values.get(state).unwrap_or(&zero);
                    let right = other.values.get(state).unwrap_or(&zero);
                    (state.clone(), op(left, right))
                })
                .collect(),
        )
    }

    /// Re-domains the function onto `event`, zero-filling new states.
    pub fn zero_filled_on(&self, event: &BTreeSet<S>) -> Self {
        Self::new(
            event
                .iter()
                .map(|state| {
                    let value = self.values.get(state).cloned().unwrap_or_else(Rational::zero);
                    (state.clone(), value)
                })
                .collect(),
        )
    }

    /// Drops the zero entries, making domain and support coincide.
    pub fn trimmed(&self) -> Self {
        Self::new(
            self.values
                .iter()
                .filter(|(_, value)| !value.is_zero())
                .map(|(state, value)| (state.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn into_map(self) -> BTreeMap<S, Rational> {
        self.values
    }
}

impl<S: State> Default for RationalFunction<S> {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl<S: State> FromIterator<(S, Rational)> for RationalFunction<S> {
    fn from_iter<I: IntoIterator<Item = (S, Rational)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<S: State> fmt::Display for RationalFunction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (state, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{state:?}: {value}")?;
        }
        write!(f, "}}")
    }
}

// ────────────────────────────────────────────
// Intersection-domain algebra
// ────────────────────────────────────────────

impl<S: State> Add for &RationalFunction<S> {
    type Output = RationalFunction<S>;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_intersection(rhs, |a, b| a + b)
    }
}

impl<S: State> Sub for &RationalFunction<S> {
    type Output = RationalFunction<S>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_intersection(rhs, |a, b| a - b)
    }
}

impl<S: State> Mul for &RationalFunction<S> {
    type Output = RationalFunction<S>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.zip_intersection(rhs, |a, b| a * b)
    }
}

impl<S: State> Mul<&Rational> for &RationalFunction<S> {
    type Output = RationalFunction<S>;

    fn mul(self, rhs: &Rational) -> Self::Output {
        self.scale(rhs)
    }
}

impl<S: State> Neg for &RationalFunction<S> {
    type Output = RationalFunction<S>;

    fn neg(self) -> Self::Output {
        self.map_values(|value| -value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rational::{integer, ratio};

    fn function(values: &[(&'static str, &str)]) -> RationalFunction<&'static str> {
        RationalFunction::try_from_values(values.iter().copied()).unwrap()
    }

    #[test]
    fn test_get_outside_domain_fails() {
        let f = function(&[("a", "1"), ("b", "-1/2")]);
        assert_eq!(f.get(&"b").unwrap(), &ratio(-1, 2));
        assert_eq!(f.get(&"z"), Err(ModelError::KeyMissing("\"z\"".to_string())));
    }

    #[test]
    fn test_domain_range_support() {
        let f = function(&[("a", "1"), ("b", "-1"), ("c", "0")]);
        assert_eq!(f.domain(), BTreeSet::from(["a", "b", "c"]));
        assert_eq!(f.range(), BTreeSet::from([integer(1), integer(-1), integer(0)]));
        assert_eq!(f.support(), BTreeSet::from(["a", "b"]));
    }

    #[test]
    fn test_pointwise_uses_intersection() {
        let f = function(&[("a", "1.1"), ("b", "-1/2"), ("c", "0")]);
        let g = function(&[("b", ".6"), ("c", "-2"), ("d", "0")]);
        assert_eq!(&f * &g, function(&[("b", "-3/10"), ("c", "0")]));
        assert_eq!((&f + &g).domain(), BTreeSet::from(["b", "c"]));
    }

    #[test]
    fn test_scalar_algebra() {
        let f = function(&[("a", "1.1"), ("b", "-1/2"), ("c", "0")]);
        let g = function(&[("b", ".6"), ("c", "-2"), ("d", "0")]);
        // -1 + (.3 f - g) / 2, restricted to the common domain
        let combined = (&f.scale(&ratio(3, 10)) - &g)
            .checked_div(&integer(2))
            .unwrap()
            .shifted(&integer(-1));
        assert_eq!(combined, function(&[("b", "-11/8"), ("c", "0")]));
    }

    #[test]
    fn test_division_by_zero() {
        let f = function(&[("a", "1")]);
        assert_eq!(f.checked_div(&integer(0)), Err(ModelError::DivisionByZero));
    }

    #[test]
    fn test_display() {
        let f = function(&[("a", "1/2"), ("b", "3")]);
        assert_eq!(f.to_string(), "{\"a\": 1/2, \"b\": 3}");
    }
}
