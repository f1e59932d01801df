//! Linear Programming Port - Exact LP Interface
//!
//! Defines the constraint-matrix format submitted to a solver and the
//! status, value and primal solution read back from it.
//!
//! Key design decisions:
//! - Every coefficient is an exact rational; no rounding at this boundary
//! - Rows follow the `[b, a_1, ..., a_n]` convention: `b + a·x >= 0`
//! - Variables are free; sign constraints are ordinary rows

use std::collections::BTreeSet;
use std::fmt;

use num_traits::Zero;
use serde::Serialize;

use crate::domain::rational::Rational;
use crate::error::{ModelError, Result};

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sense {
  Maximize,
  Minimize,
}

/// Linear objective `c_0 + c·x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Objective {
  /// Direction of optimization.
  pub sense: Sense,
  /// `[c_0, c_1, ..., c_n]`, same width as the constraint rows.
  pub coefficients: Vec<Rational>,
}

/// Constraint system with an optional objective.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LinearProgram {
  /// `[b, a_1, ..., a_n]` meaning `b + a·x >= 0`.
  pub rows: Vec<Vec<Rational>>,
  /// Indices of rows that hold with equality.
  pub equalities: BTreeSet<usize>,
  /// Objective; `None` asks for feasibility only.
  pub objective: Option<Objective>,
}

impl LinearProgram {
  /// Starts an empty program over `variables` free variables.
  pub fn builder(variables: usize) -> LinearProgramBuilder {
    LinearProgramBuilder {
      width: variables + 1,
      program: Self::default(),
    }
  }

  /// Number of decision variables.
  pub fn variables(&self) -> usize {
    self
      .rows
      .first()
      .or_else(|| self.objective.as_ref().map(|o| &o.coefficients))
      .map_or(0, |row| row.len().saturating_sub(1))
  }

  /// Checks that every row and the objective share one width.
  ///
  /// # Errors
  /// Returns `MalformedProgram` on ragged rows or out-of-range equality
  /// indices.
  pub fn validate(&self) -> Result<()> {
    let width = self.variables() + 1;
    if let Some(index) = self.rows.iter().position(|row| row.len() != width) {
      return Err(ModelError::MalformedProgram(format!(
        "row {index} has {} entries, expected {width}",
        self.rows[index].len()
      )));
    }
    if let Some(objective) = &self.objective {
      if objective.coefficients.len() != width {
        return Err(ModelError::MalformedProgram(format!(
          "objective has {} entries, expected {width}",
          objective.coefficients.len()
        )));
      }
    }
    if let Some(index) = self.equalities.iter().find(|&&i| i >= self.rows.len()) {
      return Err(ModelError::MalformedProgram(format!(
        "equality index {index} is out of range"
      )));
    }
    Ok(())
  }
}

/// Incremental construction of a `LinearProgram` of fixed width.
#[derive(Debug, Clone)]
pub struct LinearProgramBuilder {
  width: usize,
  program: LinearProgram,
}

impl LinearProgramBuilder {
  fn row(&self, constant: Rational, terms: &[(usize, Rational)]) -> Vec<Rational> {
    let mut row = vec![Rational::zero(); self.width];
    row[0] = constant;
    for (variable, coefficient) in terms {
      row[variable + 1] += coefficient;
    }
    row
  }

  /// Adds `constant + Σ coefficient·x_variable >= 0`.
  pub fn at_least_zero(&mut self, constant: Rational, terms: &[(usize, Rational)]) -> &mut Self {
    let row = self.row(constant, terms);
    self.program.rows.push(row);
    self
  }

  /// Adds `constant + Σ coefficient·x_variable = 0`.
  pub fn equal_zero(&mut self, constant: Rational, terms: &[(usize, Rational)]) -> &mut Self {
    let row = self.row(constant, terms);
    self.program.equalities.insert(self.program.rows.len());
    self.program.rows.push(row);
    self
  }

  /// Sets the objective `Σ coefficient·x_variable`.
  pub fn objective(&mut self, sense: Sense, terms: &[(usize, Rational)]) -> &mut Self {
    let coefficients = self.row(Rational::zero(), terms);
    self.program.objective = Some(Objective {
      sense,
      coefficients,
    });
    self
  }

  pub fn build(&self) -> LinearProgram {
    self.program.clone()
  }
}

/// Solver outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LpStatus {
  /// Optimum found (or feasible point found, without an objective).
  Optimal,
  /// No point satisfies the constraints.
  Inconsistent,
  /// The objective is unbounded on the feasible region.
  Unbounded,
  /// The solver gave up (iteration limit, numerical trouble).
  Undecided,
}

impl fmt::Display for LpStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Optimal => "optimal",
      Self::Inconsistent => "inconsistent",
      Self::Unbounded => "unbounded",
      Self::Undecided => "undecided",
    };
    f.write_str(name)
  }
}

/// What a solver reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LpSolution {
  pub status: LpStatus,
  /// Objective value, set when optimal with an objective.
  pub value: Option<Rational>,
  /// Primal solution, set when optimal.
  pub primal: Vec<Rational>,
}

impl LpSolution {
  /// A solution carrying only a non-optimal status.
  pub const fn failed(status: LpStatus) -> Self {
    Self {
      status,
      value: None,
      primal: Vec::new(),
    }
  }

  /// The primal solution, if the solver reached an optimum.
  ///
  /// # Errors
  /// Returns `LinearProgram(status)` for any other status.
  pub fn into_optimal(self) -> Result<(Option<Rational>, Vec<Rational>)> {
    match self.status {
      LpStatus::Optimal => Ok((self.value, self.primal)),
      status => Err(ModelError::LinearProgram(status)),
    }
  }
}

/// Trait for exact LP solvers.
///
/// Implementors must not introduce floating-point rounding. A program
/// without objective is a feasibility question: `Optimal` means feasible
/// and `primal` holds a feasible point.
#[cfg_attr(test, mockall::automock)]
pub trait LpSolver: Send + Sync {
  /// Solve `program`.
  fn solve(&self, program: &LinearProgram) -> LpSolution;
}
