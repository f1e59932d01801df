//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` in exact rational
//! arithmetic. Nothing here knows about gambles or mass functions; the
//! adapters see only matrices.
//!
//! Adapters:
//! - `simplex`: two-phase Bland simplex for `LpSolver`
//! - `double_description`: Motzkin double description for `PolyhedronEnumerator`

pub mod double_description;
pub mod simplex;

pub use double_description::DoubleDescription;
pub use simplex::ExactSimplex;
