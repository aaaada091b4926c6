//! Historical series and synthetic fallback configuration.

use super::parse_env;
use crate::application::market_data::synthetic::SyntheticSeriesGenerator;
use crate::domain::market::SERIES_LENGTH;
use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct HistoryEnvConfig {
    pub length: usize,
    pub lookback_days: u64,
    pub synthetic_base_price: f64,
    /// Fixed seed for reproducible synthetic series; random when unset
    pub synthetic_seed: Option<u64>,
}

impl HistoryEnvConfig {
    pub fn from_env() -> Result<Self> {
        let synthetic_seed = match env::var("SYNTHETIC_SEED") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("Failed to parse SYNTHETIC_SEED")?,
            ),
            Err(_) => None,
        };

        let length: usize = parse_env("HISTORY_LENGTH", SERIES_LENGTH)?;
        if length == 0 {
            anyhow::bail!("HISTORY_LENGTH must be greater than 0");
        }

        let synthetic_base_price: f64 = parse_env("SYNTHETIC_BASE_PRICE", 150.0)?;
        if !synthetic_base_price.is_finite() || synthetic_base_price <= 0.0 {
            anyhow::bail!("SYNTHETIC_BASE_PRICE must be a positive number");
        }

        Ok(Self {
            length,
            lookback_days: parse_env("HISTORY_LOOKBACK_DAYS", 180)?,
            synthetic_base_price,
            synthetic_seed,
        })
    }

    pub fn generator(&self) -> SyntheticSeriesGenerator {
        SyntheticSeriesGenerator {
            base_price: self.synthetic_base_price,
            length: self.length,
            lookback_days: self.lookback_days,
            ..Default::default()
        }
    }
}
