//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from numerical back ends. Adapters implement these traits.
//!
//! Port categories:
//! - `LpSolver`: exact linear programming (feasibility and optimization)
//! - `PolyhedronEnumerator`: H/V double-description conversion

pub mod lp;
pub mod polyhedron;

pub use lp::{LinearProgram, LpSolution, LpSolver, LpStatus, Objective, Sense};
pub use polyhedron::{PolyMatrix, PolyhedronEnumerator, Representation};
