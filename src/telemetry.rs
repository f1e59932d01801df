//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! host's choice. `init_tracing` is the default wiring: `RUST_LOG` when set,
//! the configured level otherwise, JSON lines unless disabled.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter from `RUST_LOG`, falling back to `config.level`.
///
/// # Errors
/// Returns an error when the configured level is not a valid directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
  match EnvFilter::try_from_default_env() {
    Ok(filter) => Ok(filter),
    Err(_) => Ok(EnvFilter::try_new(&config.level)?),
  }
}

/// Install the global subscriber.
///
/// # Errors
/// Returns an error for an invalid filter or when a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
  let filter = env_filter(config)?;
  let builder = tracing_subscriber::fmt().with_env_filter(filter);
  if config.json {
    builder
      .json()
      .try_init()
      .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
  } else {
    builder
      .try_init()
      .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
  }
}
