//! Use Cases Layer - Reasoning over the Ports
//!
//! Combines the domain containers with the `LpSolver` and
//! `PolyhedronEnumerator` ports. Each use case holds its port behind an
//! `Arc`, so one solver instance can serve all of them.
//!
//! Use cases:
//! - `ConeStrip`: positive-hull membership for relatively open cones
//! - `ConsistencyChecker`: avoiding sure loss and partial loss
//! - `NaturalExtension`: lower and upper expectations of desirability sets
//! - `DualityTransform`: desirability sets to credal sets and back
//! - `Reasoner`: facade over all of the above

pub mod conestrip;
pub mod consistency;
pub mod duality;
pub mod inference;
pub mod reasoner;

pub use conestrip::{ConeStrip, ConeStripWitness};
pub use consistency::ConsistencyChecker;
pub use duality::DualityTransform;
pub use inference::NaturalExtension;
pub use reasoner::Reasoner;

use crate::domain::Rational;
use crate::error::{ModelError, Result};
use crate::ports::lp::{LinearProgram, LpSolver};

/// Solves `program` and checks that the primal solution covers every
/// variable.
fn solve_optimal<L: LpSolver + ?Sized>(
  solver: &L,
  program: &LinearProgram,
) -> Result<(Option<Rational>, Vec<Rational>)> {
  let (value, primal) = solver.solve(program).into_optimal()?;
  if primal.len() != program.variables() {
    return Err(ModelError::MalformedProgram(format!(
      "solver returned {} primal values for {} variables",
      primal.len(),
      program.variables()
    )));
  }
  Ok((value, primal))
}
