//! Rays and cones of desirable gambles.
//!
//! A ray is a gamble scaled to max-norm one and stripped of its zero
//! entries, so proportional gambles give equal rays. Arithmetic on rays
//! gives plain gambles: a sum of rays is not normalized in general.

use std::collections::{BTreeSet, btree_set};
use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::Serialize;

use super::State;
use super::gamble::Gamble;
use super::rational::Rational;
use crate::error::{ModelError, Result};

/// Normalized direction in gamble space.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ray<S> {
    gamble: Gamble<S>,
}

impl<S: State> Ray<S> {
    /// Normalizes `gamble` and restricts it to its support.
    ///
    /// # Errors
    /// Returns `DegenerateRay` for a gamble that is identically zero.
    pub fn new(gamble: &Gamble<S>) -> Result<Self> {
        let normalized = gamble.normalized().ok_or(ModelError::DegenerateRay)?;
        Ok(Self {
            gamble: normalized.trimmed(),
        })
    }

    /// Ray of the indicator of `event`.
    ///
    /// # Errors
    /// Returns `DegenerateRay` for an empty event.
    pub fn indicator<I: IntoIterator<Item = S>>(event: I) -> Result<Self> {
        Self::new(&Gamble::indicator(event))
    }

    /// Ray of the indicator of a single state.
    pub fn unit(state: S) -> Self {
        Self {
            gamble: Gamble::indicator([state]),
        }
    }

    /// Payoff at `state`; zero off the support.
    pub fn get(&self, state: &S) -> Rational {
        self.gamble.get(state)
    }

    pub fn domain(&self) -> BTreeSet<S> {
        self.gamble.domain()
    }

    /// Same as `domain`.
    pub fn support(&self) -> BTreeSet<S> {
        self.gamble.support()
    }

    pub fn norm(&self) -> Rational {
        self.gamble.norm()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Rational)> {
        self.gamble.iter()
    }

    pub const fn as_gamble(&self) -> &Gamble<S> {
        &self.gamble
    }

    pub fn into_gamble(self) -> Gamble<S> {
        self.gamble
    }

    /// Opposite direction; still a ray.
    pub fn negated(&self) -> Self {
        Self {
            gamble: -&self.gamble,
        }
    }

    /// # Errors
    /// Returns `DivisionByZero` when `divisor` is zero.
    pub fn checked_div(&self, divisor: &Rational) -> Result<Gamble<S>> {
        self.gamble.checked_div(divisor)
    }
}

impl<S: State> TryFrom<&Gamble<S>> for Ray<S> {
    type Error = ModelError;

    fn try_from(gamble: &Gamble<S>) -> Result<Self> {
        Self::new(gamble)
    }
}

impl<S: State> TryFrom<Gamble<S>> for Ray<S> {
    type Error = ModelError;

    fn try_from(gamble: Gamble<S>) -> Result<Self> {
        Self::new(&gamble)
    }
}

impl<S: State> From<Ray<S>> for Gamble<S> {
    fn from(ray: Ray<S>) -> Self {
        ray.gamble
    }
}

impl<S: State> AsRef<Gamble<S>> for Ray<S> {
    fn as_ref(&self) -> &Gamble<S> {
        &self.gamble
    }
}

impl<S: State> fmt::Display for Ray<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.gamble, f)
    }
}

// Ray arithmetic demotes to gambles.

impl<S: State> Add for &Ray<S> {
    type Output = Gamble<S>;

    fn add(self, rhs: Self) -> Gamble<S> {
        &self.gamble + &rhs.gamble
    }
}

impl<S: State> Add<&Gamble<S>> for &Ray<S> {
    type Output = Gamble<S>;

    fn add(self, rhs: &Gamble<S>) -> Gamble<S> {
        &self.gamble + rhs
    }
}

impl<S: State> Sub for &Ray<S> {
    type Output = Gamble<S>;

    fn sub(self, rhs: Self) -> Gamble<S> {
        &self.gamble - &rhs.gamble
    }
}

impl<S: State> Sub<&Gamble<S>> for &Ray<S> {
    type Output = Gamble<S>;

    fn sub(self, rhs: &Gamble<S>) -> Gamble<S> {
        &self.gamble - rhs
    }
}

impl<S: State> Mul for &Ray<S> {
    type Output = Gamble<S>;

    fn mul(self, rhs: Self) -> Gamble<S> {
        &self.gamble * &rhs.gamble
    }
}

impl<S: State> Mul<&Rational> for &Ray<S> {
    type Output = Gamble<S>;

    fn mul(self, rhs: &Rational) -> Gamble<S> {
        self.gamble.scale(rhs)
    }
}

// ────────────────────────────────────────────
// Cone
// ────────────────────────────────────────────

/// Finite set of rays standing for the relatively open cone
/// `{ Σ μ_v v : μ_v > 0 for every generator v }`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cone<S> {
    rays: BTreeSet<Ray<S>>,
}

impl<S: State> Cone<S> {
    /// Builds a cone from gamble-like generators; proportional generators
    /// collapse into one ray.
    ///
    /// # Errors
    /// Returns `DegenerateRay` if any generator is identically zero.
    pub fn new<I, G>(generators: I) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: AsRef<Gamble<S>>,
    {
        generators
            .into_iter()
            .map(|generator| Ray::new(generator.as_ref()))
            .collect::<Result<BTreeSet<_>>>()
            .map(|rays| Self { rays })
    }

    pub fn from_rays<I: IntoIterator<Item = Ray<S>>>(rays: I) -> Self {
        Self {
            rays: rays.into_iter().collect(),
        }
    }

    /// The open ray through `ray`.
    pub fn singleton(ray: Ray<S>) -> Self {
        Self::from_rays([ray])
    }

    /// One unit ray per state: the vacuous generators of `event`.
    pub fn unit_rays<I: IntoIterator<Item = S>>(event: I) -> Self {
        Self::from_rays(event.into_iter().map(Ray::unit))
    }

    /// Union of the generator domains.
    pub fn domain(&self) -> BTreeSet<S> {
        self.rays.iter().flat_map(Ray::domain).collect()
    }

    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    pub fn contains(&self, ray: &Ray<S>) -> bool {
        self.rays.contains(ray)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Ray<S>> {
        self.rays.iter()
    }

    /// Sum of the generators, a gamble in the interior of the cone.
    pub fn barycenter(&self) -> Gamble<S> {
        self.rays
            .iter()
            .fold(Gamble::default(), |acc, ray| &acc + ray.as_gamble())
    }
}

impl<'a, S: State> IntoIterator for &'a Cone<S> {
    type Item = &'a Ray<S>;
    type IntoIter = btree_set::Iter<'a, Ray<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rays.iter()
    }
}

impl<S: State> FromIterator<Ray<S>> for Cone<S> {
    fn from_iter<I: IntoIterator<Item = Ray<S>>>(iter: I) -> Self {
        Self::from_rays(iter)
    }
}

impl<S: State> From<Ray<S>> for Cone<S> {
    fn from(ray: Ray<S>) -> Self {
        Self::singleton(ray)
    }
}
