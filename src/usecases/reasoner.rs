//! Reasoner - Facade over the Reasoning Use Cases
//!
//! Wires one `LpSolver` and one `PolyhedronEnumerator` into every use case
//! and exposes their operations behind a single value. `Reasoner::exact()`
//! uses the exact reference adapters with default limits.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::adapters::{DoubleDescription, ExactSimplex};
use crate::config::EngineConfig;
use crate::domain::{Cone, CredalSet, DesirabilitySet, Gamble, Rational, State};
use crate::error::Result;
use crate::ports::lp::LpSolver;
use crate::ports::polyhedron::PolyhedronEnumerator;

use super::{ConeStrip, ConeStripWitness, ConsistencyChecker, DualityTransform, NaturalExtension};

/// All reasoning operations over shared ports.
pub struct Reasoner<L: LpSolver, P: PolyhedronEnumerator> {
  consistency: ConsistencyChecker<L>,
  extension: NaturalExtension<L>,
  conestrip: ConeStrip<L>,
  duality: DualityTransform<P>,
}

impl<L: LpSolver, P: PolyhedronEnumerator> Reasoner<L, P> {
  pub fn new(solver: Arc<L>, enumerator: Arc<P>) -> Self {
    Self {
      consistency: ConsistencyChecker::new(Arc::clone(&solver)),
      extension: NaturalExtension::new(Arc::clone(&solver)),
      conestrip: ConeStrip::new(solver),
      duality: DualityTransform::new(enumerator),
    }
  }

  /// # Errors
  /// See [`ConsistencyChecker::avoids_sure_loss`].
  pub fn avoids_sure_loss<S: State>(&self, set: &DesirabilitySet<S>) -> Result<bool> {
    self.consistency.avoids_sure_loss(set)
  }

  /// # Errors
  /// See [`ConsistencyChecker::avoids_partial_loss`].
  pub fn avoids_partial_loss<S: State>(&self, set: &DesirabilitySet<S>) -> Result<bool> {
    self.consistency.avoids_partial_loss(set)
  }

  /// # Errors
  /// See [`NaturalExtension::lower_expectation`].
  pub fn lower_expectation<S: State>(&self, set: &DesirabilitySet<S>, gamble: &Gamble<S>) -> Result<Rational> {
    self.extension.lower_expectation(set, gamble)
  }

  /// # Errors
  /// See [`NaturalExtension::upper_expectation`].
  pub fn upper_expectation<S: State>(&self, set: &DesirabilitySet<S>, gamble: &Gamble<S>) -> Result<Rational> {
    self.extension.upper_expectation(set, gamble)
  }

  /// # Errors
  /// See [`ConeStrip::feasible`].
  pub fn feasible<S: State>(
    &self,
    cones: &[Cone<S>],
    target: Option<&Gamble<S>>,
  ) -> Result<Option<ConeStripWitness<S>>> {
    self.conestrip.feasible(cones, target)
  }

  /// # Errors
  /// See [`ConeStrip::is_desirable`].
  pub fn is_desirable<S: State>(&self, set: &DesirabilitySet<S>, gamble: &Gamble<S>) -> Result<bool> {
    self.conestrip.is_desirable(set, gamble)
  }

  /// # Errors
  /// See [`DualityTransform::to_credal_set`].
  pub fn to_credal_set<S: State>(&self, set: &DesirabilitySet<S>) -> Result<CredalSet<S>> {
    self.duality.to_credal_set(set)
  }

  /// # Errors
  /// See [`DualityTransform::to_desirability_set`].
  pub fn to_desirability_set<S: State>(&self, credal: &CredalSet<S>) -> Result<DesirabilitySet<S>> {
    self.duality.to_desirability_set(credal)
  }

  /// # Errors
  /// See [`DualityTransform::to_desirability_set_on`].
  pub fn to_desirability_set_on<S: State>(
    &self,
    credal: &CredalSet<S>,
    pspace: &BTreeSet<S>,
  ) -> Result<DesirabilitySet<S>> {
    self.duality.to_desirability_set_on(credal, pspace)
  }

  /// # Errors
  /// See [`DualityTransform::discard_redundant`].
  pub fn discard_redundant<S: State>(&self, credal: &mut CredalSet<S>) -> Result<usize> {
    self.duality.discard_redundant(credal)
  }
}

impl Reasoner<ExactSimplex, DoubleDescription> {
  /// Exact adapters configured from `config`.
  pub fn from_config(config: &EngineConfig) -> Self {
    info!(
      max_pivots = config.solver.max_pivots,
      max_rays = config.enumeration.max_rays,
      "exact reasoner configured"
    );
    Self::new(
      Arc::new(ExactSimplex::from_config(&config.solver)),
      Arc::new(DoubleDescription::from_config(&config.enumeration)),
    )
  }

  /// Exact adapters with default limits.
  pub fn exact() -> Self {
    Self::new(Arc::new(ExactSimplex::default()), Arc::new(DoubleDescription::default()))
  }
}

impl<L: LpSolver, P: PolyhedronEnumerator> Clone for Reasoner<L, P> {
  fn clone(&self) -> Self {
    Self {
      consistency: self.consistency.clone(),
      extension: self.extension.clone(),
      conestrip: self.conestrip.clone(),
      duality: self.duality.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::loader::parse_config;
  use crate::domain::rational::ratio;

  fn gamble(values: &[(&'static str, i64)]) -> Gamble<&'static str> {
    Gamble::try_from_values(values.iter().copied()).unwrap()
  }

  #[test]
  fn test_reasoner_round() {
    let reasoner = Reasoner::exact();
    let mut set = DesirabilitySet::vacuous(["a", "b", "c"]);
    set.set_lower_prevision(&gamble(&[("a", 1), ("b", 0), ("c", 1)]), "1/2").unwrap();

    assert!(reasoner.avoids_sure_loss(&set).unwrap());
    assert!(reasoner.avoids_partial_loss(&set).unwrap());

    let f = gamble(&[("a", 1), ("b", 0), ("c", 1)]);
    assert_eq!(reasoner.lower_expectation(&set, &f).unwrap(), ratio(1, 2));

    let credal = reasoner.to_credal_set(&set).unwrap();
    assert_eq!(credal.lower_expectation(&f).unwrap(), ratio(1, 2));
    assert_eq!(credal.upper_expectation(&f).unwrap(), ratio(1, 1));
  }

  #[test]
  fn test_partial_loss_matches_desirability_of_negative_indicator() {
    let reasoner = Reasoner::exact();
    let mut set = DesirabilitySet::vacuous(["a", "b", "c"]);
    set.add(&gamble(&[("a", -1), ("b", -1), ("c", 1)])).unwrap();
    let negative_a = -&Gamble::indicator(["a"]);
    assert!(reasoner.avoids_partial_loss(&set).unwrap());
    assert!(!reasoner.is_desirable(&set, &negative_a).unwrap());

    set.add(&gamble(&[("a", -1), ("b", 1), ("c", -1)])).unwrap();
    assert!(!reasoner.avoids_partial_loss(&set).unwrap());
    assert!(reasoner.is_desirable(&set, &negative_a).unwrap());
  }

  #[test]
  fn test_round_trip_keeps_partial_loss() {
    let reasoner = Reasoner::exact();
    let mut set = DesirabilitySet::vacuous(["a", "b", "c"]);
    let negative_a = -&Gamble::indicator(["a"]);
    set.add(&negative_a).unwrap();
    assert!(reasoner.avoids_sure_loss(&set).unwrap());
    assert!(!reasoner.avoids_partial_loss(&set).unwrap());

    let credal = reasoner.to_credal_set(&set).unwrap();
    let back = reasoner
      .to_desirability_set_on(&credal, &set.pspace().unwrap())
      .unwrap();
    let f = negative_a.restrict(&BTreeSet::from(["a", "b", "c"]));
    assert_eq!(reasoner.lower_expectation(&set, &f).unwrap(), ratio(0, 1));
    assert_eq!(reasoner.lower_expectation(&back, &f).unwrap(), ratio(0, 1));
    assert!(!reasoner.avoids_partial_loss(&back).unwrap());
  }

  #[test]
  fn test_from_config() {
    let config = parse_config("[solver]\nmax_pivots = 1").unwrap();
    let reasoner = Reasoner::from_config(&config);
    let set = DesirabilitySet::vacuous(["a", "b", "c"]);
    let f = gamble(&[("a", 2), ("b", 1), ("c", 3)]);
    // one pivot is not enough to finish phase one
    assert!(reasoner.lower_expectation(&set, &f).is_err());
    assert!(Reasoner::exact().lower_expectation(&set, &f).is_ok());
  }
}
