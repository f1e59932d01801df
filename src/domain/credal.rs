//! Credal sets: finite sets of probability mass functions.
//!
//! The members span a convex set of plausible probability models. Lower
//! and upper expectations are the minimum and maximum over the members, so
//! no solver is needed here. Redundancy removal and the duality with
//! desirability live in `usecases::duality`.

use std::collections::{BTreeSet, btree_set};

use serde::Serialize;
use tracing::debug;

use super::State;
use super::gamble::Gamble;
use super::mass::ProbabilityMassFunction;
use super::rational::Rational;
use crate::error::{ModelError, Result};

/// Mutable set of probability mass functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CredalSet<S> {
    members: BTreeSet<ProbabilityMassFunction<S>>,
}

impl<S: State> CredalSet<S> {
    pub const fn new() -> Self {
        Self {
            members: BTreeSet::new(),
        }
    }

    /// The vacuous credal set on `event`: one Dirac mass function per state.
    pub fn vacuous<I: IntoIterator<Item = S>>(event: I) -> Self {
        event.into_iter().map(ProbabilityMassFunction::dirac).collect()
    }

    pub fn add(&mut self, pmf: ProbabilityMassFunction<S>) -> bool {
        self.members.insert(pmf)
    }

    pub fn discard(&mut self, pmf: &ProbabilityMassFunction<S>) -> bool {
        self.members.remove(pmf)
    }

    pub fn contains(&self, pmf: &ProbabilityMassFunction<S>) -> bool {
        self.members.contains(pmf)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, ProbabilityMassFunction<S>> {
        self.members.iter()
    }

    /// Union of the member domains.
    ///
    /// # Errors
    /// Returns `EmptyCredalSet` when there are no members.
    pub fn pspace(&self) -> Result<BTreeSet<S>> {
        if self.members.is_empty() {
            return Err(ModelError::EmptyCredalSet);
        }
        Ok(self
            .members
            .iter()
            .flat_map(ProbabilityMassFunction::domain)
            .collect())
    }

    /// Classical set union.
    pub fn union(&self, other: &Self) -> Self {
        self.members.union(&other.members).cloned().collect()
    }

    /// Conditions every member on `event`.
    ///
    /// When some member gives `event` zero probability, conditioning is
    /// undefined for it and the whole result is the vacuous set on `event`.
    pub fn condition(&self, event: &BTreeSet<S>) -> Self {
        let conditioned: Result<Self> = self
            .members
            .iter()
            .map(|pmf| pmf.condition(event))
            .collect();
        conditioned.unwrap_or_else(|_| {
            debug!(states = event.len(), "zero conditional mass, falling back to vacuous set");
            Self::vacuous(event.iter().cloned())
        })
    }

    /// Minimum expectation of `gamble` over the members, conditional on
    /// the domain of `gamble`.
    ///
    /// # Errors
    /// Returns `EmptyCredalSet` without members, `ZeroMass` when a member
    /// gives the domain of `gamble` zero probability.
    pub fn lower_expectation(&self, gamble: &Gamble<S>) -> Result<Rational> {
        self.expectations(gamble)?
            .into_iter()
            .min()
            .ok_or(ModelError::EmptyCredalSet)
    }

    /// Maximum expectation of `gamble` over the members.
    ///
    /// # Errors
    /// As for [`Self::lower_expectation`].
    pub fn upper_expectation(&self, gamble: &Gamble<S>) -> Result<Rational> {
        self.expectations(gamble)?
            .into_iter()
            .max()
            .ok_or(ModelError::EmptyCredalSet)
    }

    fn expectations(&self, gamble: &Gamble<S>) -> Result<Vec<Rational>> {
        if self.members.is_empty() {
            return Err(ModelError::EmptyCredalSet);
        }
        self.members.iter().map(|pmf| pmf.expectation(gamble)).collect()
    }
}

impl<S: State> Default for CredalSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> FromIterator<ProbabilityMassFunction<S>> for CredalSet<S> {
    fn from_iter<I: IntoIterator<Item = ProbabilityMassFunction<S>>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl<S: State> Extend<ProbabilityMassFunction<S>> for CredalSet<S> {
    fn extend<I: IntoIterator<Item = ProbabilityMassFunction<S>>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

impl<'a, S: State> IntoIterator for &'a CredalSet<S> {
    type Item = &'a ProbabilityMassFunction<S>;
    type IntoIter = btree_set::Iter<'a, ProbabilityMassFunction<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
