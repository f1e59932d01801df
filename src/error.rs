//! Error types for the desirability engine.
//!
//! Taxonomy:
//! - Malformed input: literals, degenerate rays, invalid mass functions
//! - Empty models: expectations queried without any assessment
//! - Port failures: solver or enumerator results that cannot be used

use thiserror::Error;

use crate::ports::lp::LpStatus;
use crate::ports::polyhedron::Representation;

/// Top-level error type for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    // ═══════════════════════════════════════════════════════════════════
    // Malformed input
    // ═══════════════════════════════════════════════════════════════════

    #[error("{0:?} is not a rational number")]
    NotARational(String),

    #[error("rays cannot be generated by an identically zero gamble")]
    DegenerateRay,

    #[error("probability mass functions must have nonnegative values")]
    NegativeMass,

    #[error("mass function has a total mass of zero")]
    ZeroMass,

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} is outside the domain of the function")]
    KeyMissing(String),

    #[error("expected a {expected} representation, got a {found} representation")]
    DomainTypeMismatch {
        expected: Representation,
        found: Representation,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Empty models
    // ═══════════════════════════════════════════════════════════════════

    #[error("empty credal sets have no expectations")]
    EmptyCredalSet,

    #[error("empty sets of desirable gambles have no possibility space")]
    EmptyDesirabilitySet,

    // ═══════════════════════════════════════════════════════════════════
    // Port failures
    // ═══════════════════════════════════════════════════════════════════

    #[error("the linear program is {0}")]
    LinearProgram(LpStatus),

    #[error("malformed linear program: {0}")]
    MalformedProgram(String),

    #[error("malformed polyhedron matrix: {0}")]
    MalformedMatrix(String),

    #[error("double description exceeded {0} intermediate rays")]
    EnumerationLimit(usize),
}

impl ModelError {
    /// Solver status carried by a linear-program failure, if any.
    pub const fn lp_status(&self) -> Option<LpStatus> {
        match self {
            Self::LinearProgram(status) => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, ModelError>;
