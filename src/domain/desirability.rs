//! Sets of desirable gambles.
//!
//! A `DesirabilitySet` is a mutable collection of cones, one per
//! assessment. Jointly the cones say that every gamble in their positive
//! hull is desirable. Consistency checks and natural extension need a
//! linear-programming solver and live in `usecases`.

use std::collections::{BTreeSet, btree_set};

use serde::Serialize;

use super::State;
use super::gamble::Gamble;
use super::rational::{Rational, ToRational};
use super::ray::{Cone, Ray};
use crate::error::{ModelError, Result};

/// Mutable set of cones of desirable gambles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DesirabilitySet<S> {
    cones: BTreeSet<Cone<S>>,
}

impl<S: State> DesirabilitySet<S> {
    pub const fn new() -> Self {
        Self {
            cones: BTreeSet::new(),
        }
    }

    /// One singleton cone per gamble.
    ///
    /// # Errors
    /// Returns `DegenerateRay` if any gamble is identically zero.
    pub fn from_gambles<I, G>(gambles: I) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: AsRef<Gamble<S>>,
    {
        let mut set = Self::new();
        for gamble in gambles {
            set.add(gamble.as_ref())?;
        }
        Ok(set)
    }

    pub fn from_cones<I: IntoIterator<Item = Cone<S>>>(cones: I) -> Self {
        let mut set = Self::new();
        for cone in cones {
            set.add_cone(cone);
        }
        set
    }

    /// The vacuous model on `event`: one unit ray per state, each in its
    /// own cone.
    pub fn vacuous<I: IntoIterator<Item = S>>(event: I) -> Self {
        Self::from_cones(event.into_iter().map(|state| Cone::singleton(Ray::unit(state))))
    }

    /// Inserts the singleton cone generated by `gamble`.
    ///
    /// # Errors
    /// Returns `DegenerateRay` if `gamble` is identically zero.
    pub fn add(&mut self, gamble: &Gamble<S>) -> Result<bool> {
        Ok(self.add_cone(Cone::singleton(Ray::new(gamble)?)))
    }

    /// Inserts `cone`; an empty cone asserts nothing and is skipped.
    pub fn add_cone(&mut self, cone: Cone<S>) -> bool {
        if cone.is_empty() {
            return false;
        }
        self.cones.insert(cone)
    }

    /// Removes the singleton cone generated by `gamble`, if present.
    pub fn discard(&mut self, gamble: &Gamble<S>) -> bool {
        Ray::new(gamble).is_ok_and(|ray| self.cones.remove(&Cone::singleton(ray)))
    }

    pub fn discard_cone(&mut self, cone: &Cone<S>) -> bool {
        self.cones.remove(cone)
    }

    pub fn contains(&self, cone: &Cone<S>) -> bool {
        self.cones.contains(cone)
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Cone<S>> {
        self.cones.iter()
    }

    /// Union of the cone domains.
    ///
    /// # Errors
    /// Returns `EmptyDesirabilitySet` when there are no cones.
    pub fn pspace(&self) -> Result<BTreeSet<S>> {
        if self.cones.is_empty() {
            return Err(ModelError::EmptyDesirabilitySet);
        }
        Ok(self.cones.iter().flat_map(Cone::domain).collect())
    }

    /// Every generator ray, across all cones, once.
    pub fn generators(&self) -> BTreeSet<&Ray<S>> {
        self.cones.iter().flat_map(Cone::iter).collect()
    }

    /// Asserts that the lower prevision of `gamble` is `value`.
    ///
    /// The domain of `gamble` is the conditioning event `E`; the inserted
    /// cone is generated by `gamble - value·I_E` and `I_E`.
    ///
    /// # Errors
    /// Returns `NotARational` for a malformed value and `DegenerateRay` for
    /// an empty gamble.
    pub fn set_lower_prevision<V: ToRational>(&mut self, gamble: &Gamble<S>, value: V) -> Result<()> {
        let value = value.to_rational()?;
        self.assert_lower(gamble, &value)
    }

    /// Asserts that the upper prevision of `gamble` is `value`.
    ///
    /// # Errors
    /// As for [`Self::set_lower_prevision`].
    pub fn set_upper_prevision<V: ToRational>(&mut self, gamble: &Gamble<S>, value: V) -> Result<()> {
        let value = value.to_rational()?;
        self.assert_lower(&-gamble, &-value)
    }

    /// Asserts both the lower and the upper prevision.
    ///
    /// # Errors
    /// As for [`Self::set_lower_prevision`].
    pub fn set_prevision<V: ToRational>(&mut self, gamble: &Gamble<S>, value: V) -> Result<()> {
        let value = value.to_rational()?;
        self.assert_lower(gamble, &value)?;
        self.assert_lower(&-gamble, &-value)
    }

    fn assert_lower(&mut self, gamble: &Gamble<S>, value: &Rational) -> Result<()> {
        let event = gamble.domain();
        let indicator = Ray::indicator(event.iter().cloned())?;
        let marginal = gamble - &indicator.as_gamble().scale(value);
        let cone = if marginal.is_zero() {
            // f equals v on its whole domain: only I_E remains
            Cone::singleton(indicator)
        } else {
            Cone::from_rays([Ray::new(&marginal)?, indicator])
        };
        self.add_cone(cone);
        Ok(())
    }
}

impl<S: State> Default for DesirabilitySet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: State> IntoIterator for &'a DesirabilitySet<S> {
    type Item = &'a Cone<S>;
    type IntoIter = btree_set::Iter<'a, Cone<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cones.iter()
    }
}

impl<S: State> FromIterator<Cone<S>> for DesirabilitySet<S> {
    fn from_iter<I: IntoIterator<Item = Cone<S>>>(iter: I) -> Self {
        Self::from_cones(iter)
    }
}

impl<S: State> Extend<Cone<S>> for DesirabilitySet<S> {
    fn extend<I: IntoIterator<Item = Cone<S>>>(&mut self, iter: I) {
        for cone in iter {
            self.add_cone(cone);
        }
    }
}
