//! Configuration Module - TOML-based Engine Configuration
//!
//! Every section has defaults, so an empty file (or no file at all) yields
//! a working engine. Values are validated in `loader` before use.

pub mod loader;

use serde::Deserialize;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Tracing subscriber settings.
  pub logging: LoggingConfig,
  /// Exact simplex settings.
  pub solver: SolverConfig,
  /// Double description settings.
  pub enumeration: EnumerationConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Filter directive (trace, debug, info, warn, error or a full
  /// `EnvFilter` expression). `RUST_LOG` takes precedence.
  pub level: String,
  /// Emit JSON lines instead of human-readable output.
  pub json: bool,
}

/// Linear-programming solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
  /// Pivot budget per program; exceeding it reports `undecided`.
  pub max_pivots: usize,
}

/// Polyhedron enumeration configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
  /// Upper bound on intermediate rays.
  pub max_rays: usize,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      json: true,
    }
  }
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      max_pivots: crate::adapters::ExactSimplex::DEFAULT_MAX_PIVOTS,
    }
  }
}

impl Default for EnumerationConfig {
  fn default() -> Self {
    Self {
      max_rays: crate::adapters::DoubleDescription::DEFAULT_MAX_RAYS,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}
