//! Unit mass functions and probability mass functions.
//!
//! A mass function is sum-normalized (total mass one) and its domain
//! coincides with its support. Restriction becomes conditioning, which
//! renormalizes and fails when the event carries zero net mass. Probability
//! mass functions additionally have nonnegative entries.

use std::collections::BTreeSet;
use std::fmt;

use num_traits::{One, Zero};
use serde::Serialize;

use super::State;
use super::function::RationalFunction;
use super::gamble::Gamble;
use super::rational::{Rational, ToRational};
use crate::error::{ModelError, Result};

/// Signed mass function with total mass one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MassFunction<S> {
    function: RationalFunction<S>,
}

impl<S: State> MassFunction<S> {
    /// Sum-normalizes `gamble` and drops its zero entries.
    ///
    /// # Errors
    /// Returns `ZeroMass` when the values sum to zero.
    pub fn new(gamble: &Gamble<S>) -> Result<Self> {
        let normalized = gamble.sum_normalized().ok_or(ModelError::ZeroMass)?;
        Ok(Self {
            function: normalized.trimmed().into_function(),
        })
    }

    /// # Errors
    /// Returns `NotARational` or `ZeroMass`.
    pub fn try_from_values<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        V: ToRational,
    {
        Self::new(&Gamble::try_from_values(values)?)
    }

    /// Uniform mass over `event`.
    ///
    /// # Errors
    /// Returns `ZeroMass` for an empty event.
    pub fn uniform<I: IntoIterator<Item = S>>(event: I) -> Result<Self> {
        Self::new(&Gamble::indicator(event))
    }

    /// Mass on `state`; zero outside the support.
    pub fn get(&self, state: &S) -> Rational {
        self.function.value(state).cloned().unwrap_or_else(Rational::zero)
    }

    /// Same as the support.
    pub fn domain(&self) -> BTreeSet<S> {
        self.function.domain()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Rational)> {
        self.function.iter()
    }

    /// Conditional mass function on `event`.
    ///
    /// # Errors
    /// Returns `ZeroMass` when `event` has zero net mass.
    pub fn condition(&self, event: &BTreeSet<S>) -> Result<Self> {
        Self::new(&Gamble::from_function(self.function.zero_filled_on(event)))
    }

    /// Weighted sum `Σ m[x] f[x]`, with the domain of `gamble` acting as
    /// conditioning event.
    ///
    /// # Errors
    /// Returns `ZeroMass` when the conditioning event has zero net mass.
    pub fn expectation(&self, gamble: &Gamble<S>) -> Result<Rational> {
        let event: BTreeSet<S> = gamble
            .domain()
            .into_iter()
            .filter(|state| self.function.contains(state))
            .collect();
        let conditional = self.condition(&event)?;
        Ok(conditional
            .iter()
            .fold(Rational::zero(), |acc, (state, mass)| acc + mass * gamble.get(state)))
    }

    pub fn is_nonnegative(&self) -> bool {
        let zero = Rational::zero();
        self.function.values().all(|mass| mass >= &zero)
    }

    /// The mass function read as a gamble.
    pub fn to_gamble(&self) -> Gamble<S> {
        Gamble::from_function(self.function.clone())
    }
}

impl<S: State> fmt::Display for MassFunction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.function, f)
    }
}

// ────────────────────────────────────────────
// Probability mass functions
// ────────────────────────────────────────────

/// Mass function with nonnegative entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProbabilityMassFunction<S> {
    mass: MassFunction<S>,
}

impl<S: State> ProbabilityMassFunction<S> {
    /// # Errors
    /// Returns `ZeroMass` for a zero total and `NegativeMass` for a
    /// negative entry.
    pub fn new(gamble: &Gamble<S>) -> Result<Self> {
        MassFunction::new(gamble).and_then(Self::from_mass)
    }

    /// # Errors
    /// Returns `NotARational`, `ZeroMass` or `NegativeMass`.
    pub fn try_from_values<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        V: ToRational,
    {
        Self::new(&Gamble::try_from_values(values)?)
    }

    /// # Errors
    /// Returns `NegativeMass` when `mass` has a negative entry.
    pub fn from_mass(mass: MassFunction<S>) -> Result<Self> {
        if !mass.is_nonnegative() {
            return Err(ModelError::NegativeMass);
        }
        Ok(Self { mass })
    }

    /// Degenerate distribution on `state`.
    pub fn dirac(state: S) -> Self {
        Self {
            mass: MassFunction {
                function: RationalFunction::from_iter([(state, Rational::one())]),
            },
        }
    }

    /// # Errors
    /// Returns `ZeroMass` for an empty event.
    pub fn uniform<I: IntoIterator<Item = S>>(event: I) -> Result<Self> {
        MassFunction::uniform(event).map(|mass| Self { mass })
    }

    pub fn get(&self, state: &S) -> Rational {
        self.mass.get(state)
    }

    pub fn domain(&self) -> BTreeSet<S> {
        self.mass.domain()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Rational)> {
        self.mass.iter()
    }

    /// # Errors
    /// Returns `ZeroMass` when `event` has zero probability.
    pub fn condition(&self, event: &BTreeSet<S>) -> Result<Self> {
        self.mass.condition(event).map(|mass| Self { mass })
    }

    /// Expectation of `gamble` conditional on its domain.
    ///
    /// # Errors
    /// Returns `ZeroMass` when the domain of `gamble` has zero probability.
    pub fn expectation(&self, gamble: &Gamble<S>) -> Result<Rational> {
        self.mass.expectation(gamble)
    }

    pub const fn as_mass(&self) -> &MassFunction<S> {
        &self.mass
    }

    pub fn to_gamble(&self) -> Gamble<S> {
        self.mass.to_gamble()
    }
}

impl<S: State> TryFrom<MassFunction<S>> for ProbabilityMassFunction<S> {
    type Error = ModelError;

    fn try_from(mass: MassFunction<S>) -> Result<Self> {
        Self::from_mass(mass)
    }
}

impl<S: State> fmt::Display for ProbabilityMassFunction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.mass, f)
    }
}
