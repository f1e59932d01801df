//! Property-Based Tests - Algebra and Reasoning Invariants
//!
//! Uses `proptest` to check that gambles, rays, mass functions and the
//! reasoning use cases keep their invariants across random inputs.

use std::collections::{BTreeMap, BTreeSet};

use num_traits::{One, Zero};
use proptest::prelude::*;

use desirability_engine::domain::{
    CredalSet, DesirabilitySet, Gamble, MassFunction, ProbabilityMassFunction, Rational, Ray,
    integer,
};
use desirability_engine::usecases::Reasoner;

const STATES: [&str; 4] = ["a", "b", "c", "d"];

fn gamble_strategy() -> impl Strategy<Value = Gamble<&'static str>> {
    prop::collection::btree_map(prop::sample::select(STATES.to_vec()), -6i64..=6, 1..=4)
        .prop_map(|values: BTreeMap<&'static str, i64>| {
            values.into_iter().map(|(state, value)| (state, integer(value))).collect::<Gamble<_>>()
        })
}

fn nonzero_gamble_strategy() -> impl Strategy<Value = Gamble<&'static str>> {
    gamble_strategy().prop_filter("gamble must not be zero", |gamble| !gamble.is_zero())
}

fn pmf_strategy() -> impl Strategy<Value = ProbabilityMassFunction<&'static str>> {
    prop::collection::vec(0i64..=5, 3)
        .prop_filter("some mass is needed", |weights| weights.iter().any(|&w| w > 0))
        .prop_map(|weights| {
            let gamble: Gamble<&'static str> = STATES[..3]
                .iter()
                .copied()
                .zip(weights.into_iter().map(integer))
                .collect();
            ProbabilityMassFunction::new(&gamble).expect("nonnegative with positive total")
        })
}

fn credal_strategy() -> impl Strategy<Value = CredalSet<&'static str>> {
    prop::collection::vec(pmf_strategy(), 1..=4).prop_map(|members| members.into_iter().collect())
}

// ── Gamble Algebra ──────────────────────────────────────────

proptest! {
    /// Sums live on the union of the domains and add pointwise.
    #[test]
    fn gamble_sum_is_pointwise_on_union(f in gamble_strategy(), g in gamble_strategy()) {
        let sum = &f + &g;
        let union: BTreeSet<_> = f.domain().union(&g.domain()).copied().collect();
        prop_assert_eq!(sum.domain(), union);
        for state in STATES {
            prop_assert_eq!(sum.get(&state), f.get(&state) + g.get(&state));
        }
    }

    /// Scaling and shifting bring any non-constant gamble into [0, 1].
    #[test]
    fn scaled_shifted_spans_unit_interval(f in gamble_strategy()) {
        let (low, high) = f.bounds();
        match f.scaled_shifted() {
            Some(scaled) => {
                prop_assert!(low < high);
                prop_assert_eq!(scaled.bounds(), (Rational::zero(), Rational::one()));
            }
            None => prop_assert_eq!(low, high),
        }
    }
}

// ── Rays ────────────────────────────────────────────────────

proptest! {
    /// Rays have max-norm one and no zero entries.
    #[test]
    fn ray_is_normalized_on_support(f in nonzero_gamble_strategy()) {
        let ray = Ray::new(&f).unwrap();
        prop_assert_eq!(ray.norm(), Rational::one());
        prop_assert_eq!(ray.domain(), ray.support());
        prop_assert_eq!(ray.support(), f.support());
    }

    /// Building a ray from a ray, or from a positive multiple, changes nothing.
    #[test]
    fn ray_is_scale_invariant(f in nonzero_gamble_strategy(), k in 1i64..=9) {
        let ray = Ray::new(&f).unwrap();
        prop_assert_eq!(&Ray::new(ray.as_gamble()).unwrap(), &ray);
        prop_assert_eq!(&Ray::new(&f.scale(&integer(k))).unwrap(), &ray);
        prop_assert_ne!(&Ray::new(&-&f).unwrap(), &ray);
    }
}

// ── Mass Functions ──────────────────────────────────────────

proptest! {
    /// Mass functions sum to one on their support.
    #[test]
    fn mass_function_has_unit_total(f in gamble_strategy()) {
        if let Ok(mass) = MassFunction::new(&f) {
            let total = mass.iter().fold(Rational::zero(), |acc, (_, m)| acc + m);
            prop_assert_eq!(total, Rational::one());
            prop_assert!(mass.iter().all(|(_, m)| !m.is_zero()));
        }
    }

    /// A PMF expectation lies between the bounds of the gamble.
    #[test]
    fn expectation_is_bounded(p in pmf_strategy(), f in gamble_strategy()) {
        let f: Gamble<&str> = STATES[..3].iter().map(|&state| (state, f.get(&state))).collect();
        let (low, high) = f.bounds();
        let expectation = p.expectation(&f).unwrap();
        prop_assert!(low <= expectation && expectation <= high);
    }
}

// ── Credal Sets ─────────────────────────────────────────────

proptest! {
    /// Lower and upper expectations are conjugate and ordered.
    #[test]
    fn credal_bounds_are_conjugate(credal in credal_strategy(), f in gamble_strategy()) {
        let f: Gamble<&str> = STATES[..3].iter().map(|&state| (state, f.get(&state))).collect();
        let lower = credal.lower_expectation(&f).unwrap();
        let upper = credal.upper_expectation(&f).unwrap();
        prop_assert!(lower <= upper);
        prop_assert_eq!(credal.upper_expectation(&-&f).unwrap(), -lower);
    }
}

// ── Reasoning ───────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Avoiding partial loss is the stronger property.
    #[test]
    fn partial_loss_implies_sure_loss(
        gambles in prop::collection::vec(nonzero_gamble_strategy(), 1..=3),
    ) {
        let reasoner = Reasoner::exact();
        let mut set = DesirabilitySet::vacuous(STATES);
        for gamble in &gambles {
            set.add(gamble).unwrap();
        }
        let asl = reasoner.avoids_sure_loss(&set).unwrap();
        let apl = reasoner.avoids_partial_loss(&set).unwrap();
        prop_assert!(!apl || asl);
    }

    /// The natural extension of the dual desirability set recovers the
    /// credal lower expectation.
    #[test]
    fn duality_preserves_lower_expectation(credal in credal_strategy(), f in gamble_strategy()) {
        let f: Gamble<&str> = credal.pspace().unwrap().into_iter().map(|state| (state, f.get(&state))).collect();
        let reasoner = Reasoner::exact();
        let set = reasoner.to_desirability_set(&credal).unwrap();
        let lower = reasoner.lower_expectation(&set, &f).unwrap();
        prop_assert_eq!(lower, credal.lower_expectation(&f).unwrap());
    }

    /// Closing a model through its credal set keeps every lower and upper
    /// expectation, also when the model incurs partial loss.
    #[test]
    fn desirability_round_trip_keeps_expectations(
        gambles in prop::collection::vec(nonzero_gamble_strategy(), 1..=3),
        with_vacuous in any::<bool>(),
        f in gamble_strategy(),
    ) {
        let reasoner = Reasoner::exact();
        let mut set = DesirabilitySet::from_gambles(&gambles).unwrap();
        if with_vacuous {
            set.extend(DesirabilitySet::vacuous(STATES).iter().cloned());
        }
        prop_assume!(reasoner.avoids_sure_loss(&set).unwrap());

        let credal = reasoner.to_credal_set(&set).unwrap();
        let back = reasoner
            .to_desirability_set_on(&credal, &set.pspace().unwrap())
            .unwrap();
        prop_assert_eq!(
            reasoner.lower_expectation(&back, &f),
            reasoner.lower_expectation(&set, &f)
        );
        prop_assert_eq!(
            reasoner.upper_expectation(&back, &f),
            reasoner.upper_expectation(&set, &f)
        );
    }

    /// Going to a desirability set and back keeps exactly the extreme points.
    #[test]
    fn duality_round_trip_keeps_extreme_points(credal in credal_strategy()) {
        let reasoner = Reasoner::exact();
        let back = reasoner
            .to_credal_set(&reasoner.to_desirability_set(&credal).unwrap())
            .unwrap();
        let mut extreme = credal.clone();
        reasoner.discard_redundant(&mut extreme).unwrap();
        prop_assert_eq!(back, extreme);
    }

    /// Discarding redundant members never changes the lower expectation.
    #[test]
    fn discard_redundant_keeps_bounds(credal in credal_strategy(), f in gamble_strategy()) {
        let f: Gamble<&str> = STATES[..3].iter().map(|&state| (state, f.get(&state))).collect();
        let mut reduced = credal.clone();
        Reasoner::exact().discard_redundant(&mut reduced).unwrap();
        prop_assert!(!reduced.is_empty());
        prop_assert_eq!(
            reduced.lower_expectation(&f).unwrap(),
            credal.lower_expectation(&f).unwrap()
        );
    }
}
