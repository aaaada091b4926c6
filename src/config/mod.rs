//! Configuration module for Marketscope.
//!
//! Structured configuration loaded from environment variables, organized by
//! concern: Providers, Snapshot, History and Observability.

mod history_config;
mod observability_config;
mod provider_config;
mod snapshot_config;

pub use history_config::HistoryEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use provider_config::{AlphaVantageConfig, ProviderEnvConfig, YahooConfig};
pub use snapshot_config::{DEFAULT_UNIVERSE, SnapshotEnvConfig};

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Where quotes and daily series come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Deterministic in-memory sources, no network
    Mock,
    Live,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "live" => Ok(Mode::Live),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'mock' or 'live'", s),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub providers: ProviderEnvConfig,
    pub snapshot: SnapshotEnvConfig,
    pub history: HistoryEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("MODE").unwrap_or_else(|_| "live".to_string());
        let mode = Mode::from_str(&mode_str)?;

        Ok(Self {
            mode,
            providers: ProviderEnvConfig::from_env().context("Failed to load provider config")?,
            snapshot: SnapshotEnvConfig::from_env().context("Failed to load snapshot config")?,
            history: HistoryEnvConfig::from_env().context("Failed to load history config")?,
            observability: ObservabilityEnvConfig::from_env()
                .context("Failed to load observability config")?,
        })
    }
}

/// Read `key`, falling back to `default` when unset. A set but unparsable
/// value is an error.
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}
