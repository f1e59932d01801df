//! Desirability Engine - Library Root
//!
//! Exact-rational reasoning with sets of desirable gambles, credal sets
//! and the duality between them.
//!
//! Layout follows a hexagonal split:
//! - `domain`: value types and the two model containers (no solver access)
//! - `ports`: LP solver and polyhedron enumeration interfaces
//! - `adapters`: exact reference implementations of the ports
//! - `usecases`: consistency checks, natural extension, CONEstrip, duality

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod telemetry;
pub mod usecases;

pub use error::{ModelError, Result};
