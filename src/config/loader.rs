//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `engine.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::EngineConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid config file: {}", path.display()))?;

  info!(
    path = %path.display(),
    max_pivots = config.solver.max_pivots,
    max_rays = config.enumeration.max_rays,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
///
/// # Errors
/// Returns an error when parsing fails or validation rules are violated.
pub fn parse_config(content: &str) -> Result<EngineConfig> {
  let config: EngineConfig =
    toml::from_str(content).context("Failed to parse engine configuration")?;
  validate_config(&config)?;
  Ok(config)
}

fn validate_config(config: &EngineConfig) -> Result<()> {
  let level = config.logging.level.trim();
  anyhow::ensure!(!level.is_empty(), "logging.level must not be empty");
  // full filter expressions such as "desirability_engine=debug" pass through
  anyhow::ensure!(
    level.contains('=') || LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()),
    "logging.level must be one of {LOG_LEVELS:?} or a filter directive, got {level:?}"
  );

  anyhow::ensure!(
    config.solver.max_pivots > 0,
    "solver.max_pivots must be positive"
  );
  anyhow::ensure!(
    config.enumeration.max_rays > 0,
    "enumeration.max_rays must be positive"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.json);
    assert_eq!(config.solver.max_pivots, 100_000);
    assert_eq!(config.enumeration.max_rays, 1_000_000);
  }

  #[test]
  fn test_partial_config() {
    let config = parse_config(
      r#"
        [logging]
        level = "desirability_engine=debug"
        json = false

        [solver]
        max_pivots = 500
      "#,
    )
    .unwrap();
    assert!(!config.logging.json);
    assert_eq!(config.solver.max_pivots, 500);
    assert_eq!(config.enumeration.max_rays, 1_000_000);
  }

  #[test]
  fn test_zero_limits_rejected() {
    assert!(parse_config("[solver]\nmax_pivots = 0").is_err());
    assert!(parse_config("[enumeration]\nmax_rays = 0").is_err());
  }

  #[test]
  fn test_unknown_level_rejected() {
    assert!(parse_config("[logging]\nlevel = \"loud\"").is_err());
  }

  #[test]
  fn test_load_from_file() {
    let path = std::env::temp_dir().join("desirability_engine_loader_test.toml");
    std::fs::write(&path, "[enumeration]\nmax_rays = 42\n").unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.enumeration.max_rays, 42);
    let _ = std::fs::remove_file(&path);
  }
}
