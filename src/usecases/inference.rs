//! Natural Extension - Lower and Upper Expectations of Desirability Sets
//!
//! The lower expectation of `f` conditional on its domain `E` is the
//! supremum of the `c` for which `f - c·I_E` dominates a nonnegative
//! combination of generator rays:
//!
//! ```text
//! maximize    c
//! subject to  f[x] - c·[x ∈ E] - Σ λ_g g[x] >= 0    for every state x
//!             λ >= 0
//! ```
//!
//! The states range over the possibility space of the set together with
//! the domain of `f`.

use std::collections::BTreeSet;
use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::{debug, instrument};

use crate::domain::{DesirabilitySet, Gamble, Rational, State};
use crate::error::{ModelError, Result};
use crate::ports::lp::{LinearProgram, LpSolver, Sense};

use super::solve_optimal;

/// Lower and upper expectations over an `LpSolver`.
pub struct NaturalExtension<L: LpSolver> {
  solver: Arc<L>,
}

impl<L: LpSolver> NaturalExtension<L> {
  pub const fn new(solver: Arc<L>) -> Self {
    Self { solver }
  }

  /// Lower expectation of `gamble`, conditional on its domain.
  ///
  /// # Errors
  /// Returns `EmptyDesirabilitySet` for an empty set and
  /// `LinearProgram(status)` when the program is not solved to optimality.
  #[instrument(skip(self, set, gamble), fields(cones = set.len(), states = gamble.len()))]
  pub fn lower_expectation<S: State>(&self, set: &DesirabilitySet<S>, gamble: &Gamble<S>) -> Result<Rational> {
    let mut states = set.pspace()?;
    let event: BTreeSet<S> = gamble.domain();
    states.extend(event.iter().cloned());
    let generators: Vec<_> = set.generators().into_iter().collect();
    let one = Rational::one();

    // x_0 = c, x_{1 + j} = λ_j
    let mut builder = LinearProgram::builder(1 + generators.len());
    for j in 0..generators.len() {
      builder.at_least_zero(Rational::zero(), &[(1 + j, one.clone())]);
    }
    for state in &states {
      let mut terms: Vec<(usize, Rational)> = generators
        .iter()
        .enumerate()
        .map(|(j, ray)| (1 + j, -ray.get(state)))
        .collect();
      if event.contains(state) {
        terms.push((0, -one.clone()));
      }
      builder.at_least_zero(gamble.get(state), &terms);
    }
    builder.objective(Sense::Maximize, &[(0, one)]);

    let (value, _) = solve_optimal(self.solver.as_ref(), &builder.build())?;
    let value = value.ok_or_else(|| {
      ModelError::MalformedProgram("solver reported an optimum without a value".to_string())
    })?;
    debug!(%value, generators = generators.len(), "lower expectation");
    Ok(value)
  }

  /// Upper expectation: `-lower_expectation(-gamble)`.
  ///
  /// # Errors
  /// As for [`Self::lower_expectation`].
  pub fn upper_expectation<S: State>(&self, set: &DesirabilitySet<S>, gamble: &Gamble<S>) -> Result<Rational> {
    self.lower_expectation(set, &-gamble).map(|value| -value)
  }
}

impl<L: LpSolver> Clone for NaturalExtension<L> {
  fn clone(&self) -> Self {
    Self::new(Arc::clone(&self.solver))
  }
}
