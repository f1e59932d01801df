//! Gambles: payoff functions with zero outside their domain.
//!
//! A gamble reads as a total function over any possibility space that
//! contains its domain, so pointwise arithmetic combines two gambles over
//! the union of their domains. The domain still matters for equality and
//! for conditional assessments, where it plays the role of the
//! conditioning event.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Signed, Zero};
use serde::Serialize;

use super::State;
use super::function::RationalFunction;
use super::rational::{Rational, ToRational};
use crate::error::Result;

/// Exact payoff function over a finite set of states.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Gamble<S> {
    function: RationalFunction<S>,
}

impl<S: State> Gamble<S> {
    pub const fn new(values: BTreeMap<S, Rational>) -> Self {
        Self::from_function(RationalFunction::new(values))
    }

    pub const fn from_function(function: RationalFunction<S>) -> Self {
        Self { function }
    }

    /// Builds a gamble from literal-like payoffs.
    ///
    /// # Errors
    /// Returns `NotARational` if any payoff fails to convert.
    pub fn try_from_values<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        V: ToRational,
    {
        RationalFunction::try_from_values(values).map(Self::from_function)
    }

    /// Indicator of `event`: one on every state of the event.
    pub fn indicator<I: IntoIterator<Item = S>>(event: I) -> Self {
        event.into_iter().map(|state| (state, Rational::one())).collect()
    }

    /// Constant gamble on `event`.
    pub fn constant<I: IntoIterator<Item = S>>(event: I, value: &Rational) -> Self {
        event.into_iter().map(|state| (state, value.clone())).collect()
    }

    /// Payoff at `state`; zero outside the domain.
    pub fn get(&self, state: &S) -> Rational {
        self.function.value(state).cloned().unwrap_or_else(Rational::zero)
    }

    pub fn domain(&self) -> BTreeSet<S> {
        self.function.domain()
    }

    pub fn range(&self) -> BTreeSet<Rational> {
        self.function.range()
    }

    pub fn support(&self) -> BTreeSet<S> {
        self.function.support()
    }

    pub fn len(&self) -> usize {
        self.function.len()
    }

    pub fn is_empty(&self) -> bool {
        self.function.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Rational)> {
        self.function.iter()
    }

    pub const fn as_function(&self) -> &RationalFunction<S> {
        &self.function
    }

    pub fn into_function(self) -> RationalFunction<S> {
        self.function
    }

    /// Restriction to `event`: labels outside it are dropped, labels of the
    /// event missing from the domain are zero-filled.
    pub fn restrict(&self, event: &BTreeSet<S>) -> Self {
        Self::from_function(self.function.zero_filled_on(event))
    }

    /// Cylindrical extension onto `domain × other`.
    pub fn extend<T: State>(&self, other: &BTreeSet<T>) -> Gamble<(S, T)> {
        self.function
            .iter()
            .flat_map(|(state, value)| {
                other
                    .iter()
                    .map(move |coordinate| ((state.clone(), coordinate.clone()), value.clone()))
            })
            .collect()
    }

    /// `(min, max)` over the range, `(0, 0)` for an empty gamble.
    pub fn bounds(&self) -> (Rational, Rational) {
        let mut values = self.function.values();
        let Some(first) = values.next() else {
            return (Rational::zero(), Rational::zero());
        };
        values.fold((first.clone(), first.clone()), |(min, max), value| {
            (
                if value < &min { value.clone() } else { min },
                if value > &max { value.clone() } else { max },
            )
        })
    }

    /// Maximum absolute payoff.
    pub fn norm(&self) -> Rational {
        let (min, max) = self.bounds();
        std::cmp::max(min.abs(), max.abs())
    }

    /// The gamble divided by its norm, `None` when the norm is zero.
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.norm();
        if norm.is_zero() {
            return None;
        }
        Some(self.scale(&norm.recip()))
    }

    /// `(f - min) / (max - min)`, `None` for a constant gamble.
    pub fn scaled_shifted(&self) -> Option<Self> {
        let (min, max) = self.bounds();
        let width = &max - &min;
        if width.is_zero() {
            return None;
        }
        Some(Self::from_function(
            self.function.map_values(|value| (value - &min) / &width),
        ))
    }

    /// Sum of payoffs.
    pub fn mass(&self) -> Rational {
        self.function.total()
    }

    /// The gamble divided by its mass, `None` when the mass is zero.
    pub fn sum_normalized(&self) -> Option<Self> {
        let mass = self.mass();
        if mass.is_zero() {
            return None;
        }
        Some(self.scale(&mass.recip()))
    }

    pub fn is_nonnegative(&self) -> bool {
        let zero = Rational::zero();
        self.function.values().all(|value| value >= &zero)
    }

    /// True when every payoff is zero (including the empty gamble).
    pub fn is_zero(&self) -> bool {
        self.function.values().all(Zero::is_zero)
    }

    pub fn scale(&self, factor: &Rational) -> Self {
        Self::from_function(self.function.scale(factor))
    }

    /// Adds `offset` to every payoff in the domain.
    pub fn shifted(&self, offset: &Rational) -> Self {
        Self::from_function(self.function.shifted(offset))
    }

    /// # Errors
    /// Returns `DivisionByZero` when `divisor` is zero.
    pub fn checked_div(&self, divisor: &Rational) -> Result<Self> {
        self.function.checked_div(divisor).map(Self::from_function)
    }

    /// Drops zero payoffs.
    pub fn trimmed(&self) -> Self {
        Self::from_function(self.function.trimmed())
    }
}

impl<S: State> Default for Gamble<S> {
    fn default() -> Self {
        Self::from_function(RationalFunction::default())
    }
}

impl<S: State> FromIterator<(S, Rational)> for Gamble<S> {
    fn from_iter<I: IntoIterator<Item = (S, Rational)>>(iter: I) -> Self {
        Self::from_function(iter.into_iter().collect())
    }
}

impl<S: State> From<RationalFunction<S>> for Gamble<S> {
    fn from(function: RationalFunction<S>) -> Self {
        Self::from_function(function)
    }
}

impl<S: State> AsRef<Self> for Gamble<S> {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<S: State> fmt::Display for Gamble<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.function, f)
    }
}

// ────────────────────────────────────────────
// Union-domain algebra
// ────────────────────────────────────────────

impl<S: State> Add for &Gamble<S> {
    type Output = Gamble<S>;

    fn add(self, rhs: Self) -> Self::Output {
        Gamble::from_function(self.function.zip_union(&rhs.function, |a, b| a + b))
    }
}

impl<S: State> Sub for &Gamble<S> {
    type Output = Gamble<S>;

    fn sub(self, rhs: Self) -> Self::Output {
        Gamble::from_function(self.function.zip_union(&rhs.function, |a, b| a - b))
    }
}

impl<S: State> Mul for &Gamble<S> {
    type Output = Gamble<S>;

    fn mul(self, rhs: Self) -> Self::Output {
        Gamble::from_function(self.function.zip_union(&rhs.function, |a, b| a * b))
    }
}

impl<S: State> Mul<&Rational> for &Gamble<S> {
    type Output = Gamble<S>;

    fn mul(self, rhs: &Rational) -> Self::Output {
        self.scale(rhs)
    }
}

impl<S: State> Neg for &Gamble<S> {
    type Output = Gamble<S>;

    fn neg(self) -> Self::Output {
        Gamble::from_function(-&self.function)
    }
}

impl<S: State> Add for Gamble<S> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        &self + &rhs
    }
}

impl<S: State> Sub for Gamble<S> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        &self - &rhs
    }
}

impl<S: State> Mul for Gamble<S> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        &self * &rhs
    }
}

impl<S: State> Mul<Rational> for Gamble<S> {
    type Output = Self;

    fn mul(self, rhs: Rational) -> Self {
        self.scale(&rhs)
    }
}

impl<S: State> Neg for Gamble<S> {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rational::{integer, ratio};
    use crate::error::ModelError;

    fn gamble(values: &[(&'static str, &str)]) -> Gamble<&'static str> {
        Gamble::try_from_values(values.iter().copied()).unwrap()
    }

    fn event(states: &[&'static str]) -> BTreeSet<&'static str> {
        states.iter().copied().collect()
    }

    #[test]
    fn test_get_defaults_to_zero() {
        let f = gamble(&[("a", "1.1"), ("b", "-1/2")]);
        assert_eq!(f.get(&"a"), ratio(11, 10));
        assert_eq!(f.get(&"z"), integer(0));
    }

    #[test]
    fn test_pointwise_uses_union() {
        let f = gamble(&[("a", "1.1"), ("b", "-1/2"), ("c", "0")]);
        let g = gamble(&[("b", ".6"), ("c", "-2"), ("d", "0")]);
        assert_eq!(
            &f + &g,
            gamble(&[("a", "11/10"), ("b", "1/10"), ("c", "-2"), ("d", "0")])
        );
        assert_eq!(
            &f * &g,
            gamble(&[("a", "0"), ("b", "-3/10"), ("c", "0"), ("d", "0")])
        );
    }

    #[test]
    fn test_scalar_combination() {
        let f = gamble(&[("a", "1.1"), ("b", "-1/2"), ("c", "0")]);
        let g = gamble(&[("b", ".6"), ("c", "-2"), ("d", "0")]);
        // -1 + (.3 f - g) / 2
        let combined = (&(&f * &ratio(3, 10)) - &g)
            .checked_div(&integer(2))
            .unwrap()
            .shifted(&integer(-1));
        assert_eq!(
            combined,
            gamble(&[("a", "-167/200"), ("b", "-11/8"), ("c", "0"), ("d", "-1")])
        );
    }

    #[test]
    fn test_restrict_zero_fills_and_drops() {
        let f = gamble(&[("a", "1.1"), ("b", "-1/2"), ("c", "0")]);
        assert_eq!(
            f.restrict(&event(&["a", "d"])),
            gamble(&[("a", "11/10"), ("d", "0")])
        );
    }

    #[test]
    fn test_extend_replicates_values() {
        let f = gamble(&[("a", "1"), ("b", "-1")]);
        let joint = f.extend(&BTreeSet::from([1u8, 2]));
        assert_eq!(joint.len(), 4);
        assert_eq!(joint.get(&("a", 2)), integer(1));
        assert_eq!(joint.get(&("b", 1)), integer(-1));
    }

    #[test]
    fn test_bounds_and_norm() {
        let f = gamble(&[("a", "1.1"), ("b", "-2"), ("c", "0")]);
        assert_eq!(f.bounds(), (integer(-2), ratio(11, 10)));
        assert_eq!(f.norm(), integer(2));
        assert_eq!(Gamble::<&str>::default().bounds(), (integer(0), integer(0)));
    }

    #[test]
    fn test_normalization_sentinels() {
        let f = gamble(&[("a", "1.1"), ("b", "-2"), ("c", "0")]);
        assert_eq!(
            f.normalized().unwrap(),
            gamble(&[("a", "11/20"), ("b", "-1"), ("c", "0")])
        );
        assert_eq!(
            f.scaled_shifted().unwrap(),
            gamble(&[("a", "1"), ("b", "0"), ("c", "20/31")])
        );
        let zero = gamble(&[("a", "0"), ("b", "0")]);
        assert!(zero.normalized().is_none());
        let constant = gamble(&[("a", "3"), ("b", "3")]);
        assert!(constant.scaled_shifted().is_none());
    }

    #[test]
    fn test_mass_and_sum_normalization() {
        let f = gamble(&[("a", "1"), ("b", "3")]);
        assert_eq!(f.mass(), integer(4));
        assert_eq!(
            f.sum_normalized().unwrap(),
            gamble(&[("a", "1/4"), ("b", "3/4")])
        );
        assert!(gamble(&[("a", "1"), ("b", "-1")]).sum_normalized().is_none());
        assert!(f.is_nonnegative());
        assert!(!(-f).is_nonnegative());
    }

    #[test]
    fn test_indicator() {
        let indicator = Gamble::indicator(["a", "b"]);
        assert_eq!(indicator, gamble(&[("a", "1"), ("b", "1")]));
        assert_eq!(indicator.support(), event(&["a", "b"]));
    }

    #[test]
    fn test_checked_div_by_zero() {
        let f = gamble(&[("a", "1")]);
        assert_eq!(f.checked_div(&integer(0)), Err(ModelError::DivisionByZero));
    }

    #[test]
    fn test_serializes_as_state_map() {
        let f = gamble(&[("a", "1/2"), ("b", "-3")]);
        let json = serde_json::to_value(&f).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(json, serde_json::to_value(&gamble(&[("b", "-6/2"), ("a", "2/4")])).unwrap());
        assert_ne!(json, serde_json::to_value(&-&f).unwrap());
    }
}
