//! Domain layer - gambles, rays, mass functions, linear maps and the two
//! model containers.
//!
//! Everything here is pure exact arithmetic over finite possibility spaces.
//! No solver access (hexagonal architecture inner ring): questions that need
//! linear programming or polyhedral enumeration live in `usecases`.
//! All value types are serializable and testable in isolation.

pub mod credal;
pub mod desirability;
pub mod function;
pub mod gamble;
pub mod linear_map;
pub mod mass;
pub mod rational;
pub mod ray;

use std::fmt::Debug;

/// Label of an elementary outcome.
///
/// Any totally ordered, cloneable label works. The ordering fixes the
/// iteration order of every map and set in the engine, so results are
/// deterministic.
pub trait State: Ord + Clone + Debug {}

impl<T: Ord + Clone + Debug> State for T {}

// Re-export core types for convenience
pub use credal::CredalSet;
pub use desirability::DesirabilitySet;
pub use function::RationalFunction;
pub use gamble::Gamble;
pub use linear_map::LinearMap;
pub use mass::{MassFunction, ProbabilityMassFunction};
pub use rational::{Rational, ToRational, integer, parse_rational, ratio};
pub use ray::{Cone, Ray};
