//! Duality Transform - Desirability Sets and Credal Sets
//!
//! A closed cone of desirable gambles and a closed credal set determine
//! each other through polar cones:
//! - `to_credal_set`: the mass functions `p >= 0` with `p·r >= 0` for every
//!   generator `r` form an H-described cone; its extreme rays, normalized,
//!   are the credal set
//! - `to_desirability_set`: the facet normals of the cone spanned by the
//!   mass functions become singleton cones
//!
//! Open cones are closed on the way, so a round trip recovers the closure.
//! States that no member of a credal set charges are carried explicitly by
//! `to_desirability_set_on`.

use std::collections::BTreeSet;
use std::sync::Arc;

use num_traits::{One, Zero};
use tracing::{debug, instrument};

use crate::domain::{
  Cone, CredalSet, DesirabilitySet, Gamble, ProbabilityMassFunction, Rational, Ray, State,
};
use crate::error::{ModelError, Result};
use crate::ports::polyhedron::{PolyMatrix, PolyhedronEnumerator, Representation};

/// Conversions between the two model types over a `PolyhedronEnumerator`.
pub struct DualityTransform<P: PolyhedronEnumerator> {
  enumerator: Arc<P>,
}

impl<P: PolyhedronEnumerator> DualityTransform<P> {
  pub const fn new(enumerator: Arc<P>) -> Self {
    Self { enumerator }
  }

  /// The closed credal set compatible with `set`.
  ///
  /// # Errors
  /// Returns `EmptyDesirabilitySet` for an empty set, `DomainTypeMismatch`
  /// when the enumerator answers with inequalities, and the enumerator's
  /// own errors.
  #[instrument(skip(self, set), fields(cones = set.len()))]
  pub fn to_credal_set<S: State>(&self, set: &DesirabilitySet<S>) -> Result<CredalSet<S>> {
    let states: Vec<S> = set.pspace()?.into_iter().collect();

    let mut rows: Vec<Vec<Rational>> = set
      .generators()
      .into_iter()
      .map(|ray| lifted(Rational::zero(), states.iter().map(|state| ray.get(state))))
      .collect();
    for axis in 0..states.len() {
      rows.push(lifted(Rational::zero(), unit(states.len(), axis)));
    }

    let generators = self
      .enumerator
      .convert(&PolyMatrix::new(Representation::Inequality, rows))?;
    let generators = generators.expect_kind(Representation::Generator)?;

    let mut credal = CredalSet::new();
    for (row, linear) in generators.iter() {
      for tail in signed_tails(row, linear) {
        let gamble: Gamble<S> = states.iter().cloned().zip(tail).collect();
        credal.add(ProbabilityMassFunction::new(&gamble)?);
      }
    }
    debug!(members = credal.len(), "credal set enumerated");
    Ok(credal)
  }

  /// The closed set of desirable gambles compatible with `credal`: one
  /// singleton cone per facet normal, over the states the members use.
  ///
  /// # Errors
  /// Returns `EmptyCredalSet` for an empty credal set, `DomainTypeMismatch`
  /// when the enumerator answers with generators, and the enumerator's own
  /// errors.
  pub fn to_desirability_set<S: State>(&self, credal: &CredalSet<S>) -> Result<DesirabilitySet<S>> {
    self.to_desirability_set_on(credal, &credal.pspace()?)
  }

  /// As [`Self::to_desirability_set`], over `pspace` together with the
  /// states the members use. A state no member charges gets both `I_x` and
  /// `-I_x`, so `to_desirability_set_on(to_credal_set(D), pspace(D))` has
  /// the natural extension of `D`. An empty credal set yields every `±I_x`.
  ///
  /// # Errors
  /// Returns `EmptyCredalSet` when there are no states at all,
  /// `DomainTypeMismatch` when the enumerator answers with generators, and
  /// the enumerator's own errors.
  #[instrument(skip(self, credal, pspace), fields(members = credal.len(), states = pspace.len()))]
  pub fn to_desirability_set_on<S: State>(
    &self,
    credal: &CredalSet<S>,
    pspace: &BTreeSet<S>,
  ) -> Result<DesirabilitySet<S>> {
    let mut states: BTreeSet<S> = pspace.clone();
    states.extend(credal.iter().flat_map(ProbabilityMassFunction::domain));
    if states.is_empty() {
      return Err(ModelError::EmptyCredalSet);
    }
    let states: Vec<S> = states.into_iter().collect();

    let mut rows: Vec<Vec<Rational>> = credal
      .iter()
      .map(|pmf| lifted(Rational::zero(), states.iter().map(|state| pmf.get(state))))
      .collect();
    // apex of the cone
    rows.push(lifted(Rational::one(), std::iter::repeat_n(Rational::zero(), states.len())));

    let inequalities = self
      .enumerator
      .convert(&PolyMatrix::new(Representation::Generator, rows))?;
    let inequalities = inequalities.expect_kind(Representation::Inequality)?;

    let mut set = DesirabilitySet::new();
    for (row, linear) in inequalities.iter() {
      for tail in signed_tails(row, linear) {
        let gamble: Gamble<S> = states.iter().cloned().zip(tail).collect();
        set.add_cone(Cone::singleton(Ray::new(&gamble)?));
      }
    }
    debug!(cones = set.len(), "desirability set enumerated");
    Ok(set)
  }

  /// Removes the members of `credal` that are not extreme points of its
  /// convex hull. Returns how many were removed.
  ///
  /// # Errors
  /// Returns the enumerator's errors; an empty credal set is left alone.
  #[instrument(skip(self, credal), fields(members = credal.len()))]
  pub fn discard_redundant<S: State>(&self, credal: &mut CredalSet<S>) -> Result<usize> {
    let Ok(states) = credal.pspace() else {
      return Ok(0);
    };
    let members: Vec<ProbabilityMassFunction<S>> = credal.iter().cloned().collect();
    let rows: Vec<Vec<Rational>> = members
      .iter()
      .map(|pmf| lifted(Rational::one(), states.iter().map(|state| pmf.get(state))))
      .collect();

    let redundant: BTreeSet<usize> = self
      .enumerator
      .redundant_rows(&PolyMatrix::new(Representation::Generator, rows))?;
    let removed = redundant
      .iter()
      .filter_map(|&index| members.get(index))
      .filter(|pmf| credal.discard(pmf))
      .count();
    debug!(removed, remaining = credal.len(), "redundant members discarded");
    Ok(removed)
  }
}

impl<P: PolyhedronEnumerator> Clone for DualityTransform<P> {
  fn clone(&self) -> Self {
    Self::new(Arc::clone(&self.enumerator))
  }
}

fn lifted(head: Rational, tail: impl IntoIterator<Item = Rational>) -> Vec<Rational> {
  std::iter::once(head).chain(tail).collect()
}

fn unit(dimension: usize, axis: usize) -> impl Iterator<Item = Rational> {
  (0..dimension).map(move |i| if i == axis { Rational::one() } else { Rational::zero() })
}

/// The tail of `row`, and its negation for a linear row; the apex and the
/// trivial inequality `1 >= 0` have a zero tail and yield nothing.
fn signed_tails(row: &[Rational], linear: bool) -> Vec<Vec<Rational>> {
  let tail = row.get(1..).unwrap_or_default();
  if tail.iter().all(Zero::is_zero) {
    return Vec::new();
  }
  let mut tails = vec![tail.to_vec()];
  if linear {
    tails.push(tail.iter().map(|value| -value).collect());
  }
  tails
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::DoubleDescription;
  use crate::domain::rational::ratio;
  use crate::ports::polyhedron::MockPolyhedronEnumerator;

  fn pmf(values: &[(&'static str, &str)]) -> ProbabilityMassFunction<&'static str> {
    ProbabilityMassFunction::try_from_values(values.iter().copied()).unwrap()
  }

  fn duality() -> DualityTransform<DoubleDescription> {
    DualityTransform::new(Arc::new(DoubleDescription::default()))
  }

  #[test]
  fn test_credal_set_of_lower_probability() {
    let mut set = DesirabilitySet::vacuous(["a", "b", "c"]);
    let f = Gamble::try_from_values([("a", 1), ("b", 0), ("c", 1)]).unwrap();
    set.set_lower_prevision(&f, 0.5).unwrap();

    let credal = duality().to_credal_set(&set).unwrap();
    let expected: CredalSet<_> = [
      ProbabilityMassFunction::dirac("a"),
      ProbabilityMassFunction::dirac("c"),
      pmf(&[("a", "1/2"), ("b", "1/2")]),
      pmf(&[("b", "1/2"), ("c", "1/2")]),
    ]
    .into_iter()
    .collect();
    assert_eq!(credal, expected);
  }

  #[test]
  fn test_vacuous_round_trip() {
    let duality = duality();
    let credal = duality
      .to_credal_set(&DesirabilitySet::vacuous(["a", "b", "c"]))
      .unwrap();
    assert_eq!(credal, CredalSet::vacuous(["a", "b", "c"]));

    let set = duality.to_desirability_set(&credal).unwrap();
    assert_eq!(set, DesirabilitySet::vacuous(["a", "b", "c"]));
  }

  #[test]
  fn test_desirability_set_of_segment() {
    let credal: CredalSet<_> = [pmf(&[("a", "1/2"), ("b", "1/2")]), ProbabilityMassFunction::dirac("a")]
      .into_iter()
      .collect();
    let set = duality().to_desirability_set(&credal).unwrap();
    // generated by I_b and I_a - I_b
    let expected = DesirabilitySet::from_gambles([
      Gamble::try_from_values([("a", 0), ("b", 1)]).unwrap(),
      Gamble::try_from_values([("a", 1), ("b", -1)]).unwrap(),
    ])
    .unwrap();
    assert_eq!(set, expected);
  }

  #[test]
  fn test_lineality_yields_both_signs() {
    let credal: CredalSet<_> = [pmf(&[("a", "1/2"), ("b", "1/2")]), ProbabilityMassFunction::dirac("c")]
      .into_iter()
      .collect();
    let set = duality().to_desirability_set(&credal).unwrap();
    let expected = DesirabilitySet::from_gambles([
      Gamble::indicator(["a"]),
      Gamble::indicator(["c"]),
      Gamble::try_from_values([("a", -1), ("b", 1)]).unwrap(),
      Gamble::try_from_values([("a", 1), ("b", -1)]).unwrap(),
    ])
    .unwrap();
    assert_eq!(set, expected);
  }

  #[test]
  fn test_uncharged_states_keep_both_signs() {
    let duality = duality();
    let mut set = DesirabilitySet::vacuous(["a", "b", "c"]);
    let negative_a = -&Gamble::indicator(["a"]);
    set.add(&negative_a).unwrap();

    let credal = duality.to_credal_set(&set).unwrap();
    assert_eq!(credal, CredalSet::vacuous(["b", "c"]));

    let back = duality.to_desirability_set_on(&credal, &set.pspace().unwrap()).unwrap();
    let expected = DesirabilitySet::from_gambles([
      Gamble::indicator(["a"]),
      negative_a,
      Gamble::indicator(["b"]),
      Gamble::indicator(["c"]),
    ])
    .unwrap();
    assert_eq!(back, expected);
    assert_eq!(duality.to_desirability_set(&credal).unwrap(), DesirabilitySet::vacuous(["b", "c"]));
  }

  #[test]
  fn test_empty_credal_set_on_pspace() {
    let duality = duality();
    let pspace = BTreeSet::from(["a", "b"]);
    let everything = duality.to_desirability_set_on(&CredalSet::new(), &pspace).unwrap();
    assert_eq!(everything.len(), 4);
    assert!(everything.contains(&Cone::singleton(Ray::unit("a").negated())));
    assert_eq!(
      duality.to_desirability_set_on(&CredalSet::<&str>::new(), &BTreeSet::new()),
      Err(ModelError::EmptyCredalSet)
    );
  }

  #[test]
  fn test_discard_redundant_keeps_extreme_points() {
    let mut credal = CredalSet::vacuous(["a", "b", "c"]);
    credal.add(ProbabilityMassFunction::uniform(["a", "b", "c"]).unwrap());
    credal.add(pmf(&[("a", "1/2"), ("b", "1/2")]));
    let removed = duality().discard_redundant(&mut credal).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(credal, CredalSet::vacuous(["a", "b", "c"]));
  }

  #[test]
  fn test_discard_redundant_on_empty_set() {
    let mut credal = CredalSet::<&str>::new();
    assert_eq!(duality().discard_redundant(&mut credal).unwrap(), 0);
  }

  #[test]
  fn test_expectations_agree_after_transform() {
    let credal: CredalSet<_> = [
      pmf(&[("a", ".03"), ("b", ".07"), ("c", ".9")]),
      pmf(&[("a", ".07"), ("b", ".03"), ("c", ".9")]),
    ]
    .into_iter()
    .collect();
    let set = duality().to_desirability_set(&credal).unwrap();
    let back = duality().to_credal_set(&set).unwrap();
    assert_eq!(back, credal);

    let f = Gamble::try_from_values([("a", -1), ("b", 1), ("c", 0)]).unwrap();
    assert_eq!(back.lower_expectation(&f).unwrap(), ratio(-1, 25));
  }

  #[test]
  fn test_wrong_representation_is_rejected() {
    let mut enumerator = MockPolyhedronEnumerator::new();
    enumerator
      .expect_convert()
      .returning(|matrix| Ok(matrix.clone()));
    let duality = DualityTransform::new(Arc::new(enumerator));
    let result = duality.to_credal_set(&DesirabilitySet::vacuous(["a"]));
    assert_eq!(
      result,
      Err(ModelError::DomainTypeMismatch {
        expected: Representation::Generator,
        found: Representation::Inequality,
      })
    );
  }
}
