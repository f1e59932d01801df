//! Consistency Checker - Avoiding Sure Loss and Partial Loss
//!
//! Sure loss: some nonnegative combination of generator rays is everywhere
//! strictly negative. One feasibility LP decides it.
//!
//! Partial loss: some positive combination of desirable gambles is
//! everywhere nonpositive and somewhere negative. Cones are relatively
//! open, so a cone either takes part with all of its generators or not at
//! all. Each round over active states `A` and active cones `E` solves
//!
//! ```text
//! maximize    Σ_{x ∈ A} τ_x + Σ_{k ∈ E} σ_k
//! subject to  Σ μ_v v[x] <= -τ_x     x ∈ A
//!             Σ μ_v v[x] <= 0        x ∉ A
//!             μ >= 0,  0 <= τ, σ <= 1,  σ_k <= μ_v for every v ∈ k
//! ```
//!
//! and shrinks `A` to `{τ = 1}` and `E` to `{σ = 1}` until a verdict.

use std::collections::BTreeSet;
use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::{debug, info, instrument};

use crate::domain::{Cone, DesirabilitySet, Rational, State};
use crate::error::{ModelError, Result};
use crate::ports::lp::{LinearProgram, LpSolver, LpStatus, Sense};

use super::solve_optimal;

/// ASL and APL checks over an `LpSolver`.
pub struct ConsistencyChecker<L: LpSolver> {
  solver: Arc<L>,
}

impl<L: LpSolver> ConsistencyChecker<L> {
  pub const fn new(solver: Arc<L>) -> Self {
    Self { solver }
  }

  /// True iff no nonnegative combination of the generators of `set` is
  /// everywhere at most `-1`. An empty set avoids sure loss.
  ///
  /// # Errors
  /// Returns `LinearProgram(status)` unless the solver reports `optimal`
  /// or `inconsistent`.
  #[instrument(skip(self, set), fields(cones = set.len()))]
  pub fn avoids_sure_loss<S: State>(&self, set: &DesirabilitySet<S>) -> Result<bool> {
    let Ok(states) = set.pspace() else {
      return Ok(true);
    };
    let generators: Vec<_> = set.generators().into_iter().collect();
    let one = Rational::one();

    let mut builder = LinearProgram::builder(generators.len());
    for j in 0..generators.len() {
      builder.at_least_zero(Rational::zero(), &[(j, one.clone())]);
    }
    for state in &states {
      let terms: Vec<(usize, Rational)> = generators
        .iter()
        .enumerate()
        .map(|(j, ray)| (j, -ray.get(state)))
        .collect();
      builder.at_least_zero(-one.clone(), &terms);
    }

    let status = self.solver.solve(&builder.build()).status;
    debug!(%status, generators = generators.len(), "sure loss program solved");
    match status {
      LpStatus::Optimal => Ok(false),
      LpStatus::Inconsistent => Ok(true),
      status => Err(ModelError::LinearProgram(status)),
    }
  }

  /// True iff no positive combination of cones of `set` is everywhere
  /// nonpositive and somewhere negative.
  ///
  /// # Errors
  /// Returns `LinearProgram(status)` when a round does not end `optimal`.
  #[instrument(skip(self, set), fields(cones = set.len()))]
  pub fn avoids_partial_loss<S: State>(&self, set: &DesirabilitySet<S>) -> Result<bool> {
    let Ok(states) = set.pspace() else {
      return Ok(true);
    };
    let mut active_states: BTreeSet<S> = states.clone();
    let mut active_cones: Vec<&Cone<S>> = set.iter().collect();

    let mut round = 0_usize;
    loop {
      round += 1;
      if active_states.is_empty() || active_cones.is_empty() {
        info!(round, "avoids partial loss");
        return Ok(true);
      }

      let program = partial_loss_program(&states, &active_states, &active_cones);
      let (_, primal) = solve_optimal(self.solver.as_ref(), &program)?;

      let generators: usize = active_cones.iter().map(|cone| cone.len()).sum();
      let one = Rational::one();
      let negative: BTreeSet<S> = active_states
        .iter()
        .enumerate()
        .filter(|(i, _)| primal[generators + i] == one)
        .map(|(_, state)| state.clone())
        .collect();
      let sigma_start = generators + active_states.len();

      let mut offset = 0;
      let mut activated: Vec<&Cone<S>> = Vec::new();
      let mut partially_used = false;
      for (k, cone) in active_cones.iter().copied().enumerate() {
        let weights = &primal[offset..offset + cone.len()];
        offset += cone.len();
        if primal[sigma_start + k] == one {
          activated.push(cone);
        } else if weights.iter().any(|w| !w.is_zero()) {
          partially_used = true;
        }
      }
      debug!(
        round,
        active_states = active_states.len(),
        negative = negative.len(),
        active_cones = active_cones.len(),
        activated = activated.len(),
        "partial loss round"
      );

      if negative.is_empty() {
        info!(round, "avoids partial loss");
        return Ok(true);
      }
      if negative.len() == active_states.len() && !partially_used {
        info!(round, "incurs partial loss");
        return Ok(false);
      }
      active_states = negative;
      active_cones = activated;
    }
  }
}

impl<L: LpSolver> Clone for ConsistencyChecker<L> {
  fn clone(&self) -> Self {
    Self::new(Arc::clone(&self.solver))
  }
}

/// Variables: `μ` per generator of the active cones, then `τ` per active
/// state, then `σ` per active cone.
fn partial_loss_program<S: State>(
  states: &BTreeSet<S>,
  active_states: &BTreeSet<S>,
  active_cones: &[&Cone<S>],
) -> LinearProgram {
  let generators: usize = active_cones.iter().map(|cone| cone.len()).sum();
  let tau_start = generators;
  let sigma_start = tau_start + active_states.len();
  let variables = sigma_start + active_cones.len();
  let zero = Rational::zero();
  let one = Rational::one();
  let mut builder = LinearProgram::builder(variables);

  let mut mu = 0;
  for (k, cone) in active_cones.iter().enumerate() {
    let sigma = sigma_start + k;
    builder.at_least_zero(zero.clone(), &[(sigma, one.clone())]);
    builder.at_least_zero(one.clone(), &[(sigma, -one.clone())]);
    for _ in cone.iter() {
      builder.at_least_zero(zero.clone(), &[(mu, one.clone())]);
      builder.at_least_zero(zero.clone(), &[(mu, one.clone()), (sigma, -one.clone())]);
      mu += 1;
    }
  }

  for i in 0..active_states.len() {
    let tau = tau_start + i;
    builder.at_least_zero(zero.clone(), &[(tau, one.clone())]);
    builder.at_least_zero(one.clone(), &[(tau, -one.clone())]);
  }

  for state in states {
    let mut terms: Vec<(usize, Rational)> = active_cones
      .iter()
      .flat_map(|cone| cone.iter())
      .enumerate()
      .map(|(j, ray)| (j, -ray.get(state)))
      .collect();
    if let Some(i) = active_states.iter().position(|active| active == state) {
      terms.push((tau_start + i, -one.clone()));
    }
    builder.at_least_zero(zero.clone(), &terms);
  }

  let objective: Vec<(usize, Rational)> = (tau_start..variables).map(|j| (j, one.clone())).collect();
  builder.objective(Sense::Maximize, &objective);
  builder.build()
}
