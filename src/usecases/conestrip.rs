//! CONEstrip - Positive Hull Membership for Relatively Open Cones
//!
//! Decides whether a target gamble is a positive combination of gambles
//! drawn from a family of relatively open cones. A cone that takes part
//! must put positive weight on every one of its generators, which a single
//! LP cannot express. Each round therefore maximizes the number of cones
//! that can be fully activated and strips the others:
//!
//! ```text
//! maximize    Σ τ_k
//! subject to  Σ_k Σ_{v ∈ k} μ_v v[x] = ν target[x]    for every state x
//!             μ >= 0,  0 <= τ <= 1,  Σ τ_k >= 1
//!             τ_k <= μ_v                              for every v ∈ k
//!             ν >= 1                                  (target given)
//! ```
//!
//! The cones with `τ_k = 1` survive. When none of the stripped cones carried
//! weight, the surviving cones form a witness.

use std::collections::BTreeSet;
use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::{debug, instrument};

use crate::domain::{Cone, DesirabilitySet, Gamble, Rational, State};
use crate::error::{ModelError, Result};
use crate::ports::lp::{LinearProgram, LpSolver, LpStatus, Sense};

use super::solve_optimal;

/// Cones and weights reproducing `scale · target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConeStripWitness<S> {
  /// Each active cone with one positive weight per generator, in the
  /// cone's iteration order.
  pub cones: Vec<(Cone<S>, Vec<Rational>)>,
  /// Multiple of the target the combination equals; one without target.
  pub scale: Rational,
}

impl<S: State> ConeStripWitness<S> {
  /// `Σ μ_v v` over the active cones.
  pub fn combination(&self) -> Gamble<S> {
    self
      .cones
      .iter()
      .flat_map(|(cone, weights)| cone.iter().zip(weights))
      .fold(Gamble::default(), |acc, (ray, weight)| {
        &acc + &ray.as_gamble().scale(weight)
      })
  }
}

/// CONEstrip feasibility over an `LpSolver`.
pub struct ConeStrip<L: LpSolver> {
  solver: Arc<L>,
}

impl<L: LpSolver> ConeStrip<L> {
  pub const fn new(solver: Arc<L>) -> Self {
    Self { solver }
  }

  /// Finds a positive combination of the `cones` equal to a positive
  /// multiple of `target`, or a nontrivial combination equal to zero when
  /// there is no target.
  ///
  /// # Errors
  /// Returns `LinearProgram(status)` when a round ends `unbounded` or
  /// `undecided`; an `inconsistent` round means no witness exists.
  #[instrument(skip(self, cones, target), fields(cones = cones.len(), target = target.is_some()))]
  pub fn feasible<S: State>(
    &self,
    cones: &[Cone<S>],
    target: Option<&Gamble<S>>,
  ) -> Result<Option<ConeStripWitness<S>>> {
    let mut states: BTreeSet<S> = cones.iter().flat_map(Cone::domain).collect();
    if let Some(target) = target {
      states.extend(target.domain());
    }
    let mut active: Vec<&Cone<S>> = cones.iter().filter(|cone| !cone.is_empty()).collect();

    let mut round = 0_usize;
    while !active.is_empty() {
      round += 1;
      let generators: usize = active.iter().map(|cone| cone.len()).sum();
      let program = strip_program(&active, &states, target);
      let primal = match solve_optimal(self.solver.as_ref(), &program) {
        Ok((_, primal)) => primal,
        Err(ModelError::LinearProgram(LpStatus::Inconsistent)) => {
          debug!(round, "no positive combination");
          return Ok(None);
        }
        Err(e) => return Err(e),
      };

      let one = Rational::one();
      let mut offset = 0;
      let mut kept: Vec<(&Cone<S>, Vec<Rational>)> = Vec::new();
      let mut stripped_weight = false;
      for (k, cone) in active.iter().copied().enumerate() {
        let weights = primal[offset..offset + cone.len()].to_vec();
        offset += cone.len();
        if primal[generators + k] == one {
          kept.push((cone, weights));
        } else if weights.iter().any(|w| !w.is_zero()) {
          stripped_weight = true;
        }
      }
      debug!(round, active = active.len(), kept = kept.len(), "cone strip round");

      if !stripped_weight {
        let scale = if target.is_some() {
          primal[generators + active.len()].clone()
        } else {
          Rational::one()
        };
        return Ok(Some(ConeStripWitness {
          cones: kept
            .into_iter()
            .map(|(cone, weights)| (cone.clone(), weights))
            .collect(),
          scale,
        }));
      }
      active = kept.into_iter().map(|(cone, _)| cone).collect();
    }
    Ok(None)
  }

  /// Whether `gamble` lies in the natural extension of `set`: the positive
  /// hull of its cones and the unit rays of every state involved. The zero
  /// gamble is desirable only when those generators admit a nontrivial
  /// combination equal to zero.
  ///
  /// # Errors
  /// As for [`Self::feasible`].
  pub fn is_desirable<S: State>(&self, set: &DesirabilitySet<S>, gamble: &Gamble<S>) -> Result<bool> {
    let mut states = set.pspace().unwrap_or_default();
    states.extend(gamble.domain());
    let cones: Vec<Cone<S>> = set
      .iter()
      .cloned()
      .chain(DesirabilitySet::vacuous(states).iter().cloned())
      .collect();
    let target = (!gamble.is_zero()).then_some(gamble);
    Ok(self.feasible(&cones, target)?.is_some())
  }
}

impl<L: LpSolver> Clone for ConeStrip<L> {
  fn clone(&self) -> Self {
    Self::new(Arc::clone(&self.solver))
  }
}

/// Variables: `μ` per generator, then `τ` per cone, then `ν` when a
/// target is given.
fn strip_program<S: State>(
  active: &[&Cone<S>],
  states: &BTreeSet<S>,
  target: Option<&Gamble<S>>,
) -> LinearProgram {
  let generators: usize = active.iter().map(|cone| cone.len()).sum();
  let nu = generators + active.len();
  let variables = nu + usize::from(target.is_some());
  let zero = Rational::zero();
  let one = Rational::one();
  let mut builder = LinearProgram::builder(variables);

  for state in states {
    let mut terms: Vec<(usize, Rational)> = active
      .iter()
      .flat_map(|cone| cone.iter())
      .enumerate()
      .map(|(j, ray)| (j, ray.get(state)))
      .collect();
    if let Some(target) = target {
      terms.push((nu, -target.get(state)));
    }
    builder.equal_zero(zero.clone(), &terms);
  }

  let mut mu = 0;
  for (k, cone) in active.iter().enumerate() {
    let tau = generators + k;
    builder.at_least_zero(zero.clone(), &[(tau, one.clone())]);
    builder.at_least_zero(one.clone(), &[(tau, -one.clone())]);
    for _ in cone.iter() {
      builder.at_least_zero(zero.clone(), &[(mu, one.clone())]);
      builder.at_least_zero(zero.clone(), &[(mu, one.clone()), (tau, -one.clone())]);
      mu += 1;
    }
  }

  let taus: Vec<(usize, Rational)> = (generators..nu).map(|tau| (tau, one.clone())).collect();
  builder.at_least_zero(-one.clone(), &taus);
  if target.is_some() {
    builder.at_least_zero(-one, &[(nu, Rational::one())]);
  }
  builder.objective(Sense::Maximize, &taus);
  builder.build()
}
