//! Polyhedron Port - Double-Description Interface
//!
//! Converts between the inequality (H) and generator (V) descriptions of
//! a polyhedron, in the homogenized row format of cdd-style libraries.
//!
//! Row conventions:
//! - Inequality: `[b, a_1, ..., a_n]` means `b + a·x >= 0`; rows in the
//!   linear set hold with equality
//! - Generator: `[1, v_1, ..., v_n]` is a vertex, `[0, r_1, ..., r_n]` a ray;
//!   rows in the linear set span lines (both `r` and `-r`)

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::domain::rational::Rational;
use crate::error::{ModelError, Result};

/// Which description a matrix carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Representation {
  Inequality,
  Generator,
}

impl fmt::Display for Representation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Inequality => "inequality (H)",
      Self::Generator => "generator (V)",
    })
  }
}

/// Homogenized matrix describing a polyhedron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolyMatrix {
  pub kind: Representation,
  pub rows: Vec<Vec<Rational>>,
  /// Equality rows (H) or lineality generators (V).
  pub linear: BTreeSet<usize>,
}

impl PolyMatrix {
  pub const fn new(kind: Representation, rows: Vec<Vec<Rational>>) -> Self {
    Self {
      kind,
      rows,
      linear: BTreeSet::new(),
    }
  }

  /// Ambient dimension plus one.
  pub fn width(&self) -> usize {
    self.rows.first().map_or(0, Vec::len)
  }

  /// Fails unless the matrix carries `expected`.
  ///
  /// # Errors
  /// Returns `DomainTypeMismatch` for the other representation.
  pub fn expect_kind(&self, expected: Representation) -> Result<&Self> {
    if self.kind == expected {
      Ok(self)
    } else {
      Err(ModelError::DomainTypeMismatch {
        expected,
        found: self.kind,
      })
    }
  }

  /// Rows with their linear-set membership.
  pub fn iter(&self) -> impl Iterator<Item = (&[Rational], bool)> {
    self
      .rows
      .iter()
      .enumerate()
      .map(|(index, row)| (row.as_slice(), self.linear.contains(&index)))
  }
}

/// Trait for exact double-description engines.
#[cfg_attr(test, mockall::automock)]
pub trait PolyhedronEnumerator: Send + Sync {
  /// The dual description of `matrix`: generators for an H-matrix,
  /// inequalities for a V-matrix.
  ///
  /// # Errors
  /// Implementations report malformed input or resource limits.
  fn convert(&self, matrix: &PolyMatrix) -> Result<PolyMatrix>;

  /// Indices of rows that can be dropped without changing the described
  /// polyhedron. For a V-matrix these are the generators that are not
  /// extreme (and all but one of a group of coincident rows).
  ///
  /// # Errors
  /// As for [`Self::convert`].
  fn redundant_rows(&self, matrix: &PolyMatrix) -> Result<BTreeSet<usize>>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::rational::integer;

  #[test]
  fn test_expect_kind() {
    let matrix = PolyMatrix::new(Representation::Generator, vec![vec![integer(1), integer(0)]]);
    assert!(matrix.expect_kind(Representation::Generator).is_ok());
    assert_eq!(
      matrix.expect_kind(Representation::Inequality),
      Err(ModelError::DomainTypeMismatch {
        expected: Representation::Inequality,
        found: Representation::Generator,
      })
    );
    assert_eq!(matrix.width(), 2);
  }

  #[test]
  fn test_iter_flags_linear_rows() {
    let mut matrix = PolyMatrix::new(
      Representation::Inequality,
      vec![vec![integer(0), integer(1)], vec![integer(0), integer(-1)]],
    );
    matrix.linear.insert(1);
    let flags: Vec<bool> = matrix.iter().map(|(_, linear)| linear).collect();
    assert_eq!(flags, vec![false, true]);
  }
}
