//! Snapshot cache and universe configuration.

use super::parse_env;
use crate::domain::market::symbol::parse_symbol_list;
use anyhow::Result;
use std::env;
use std::time::Duration;

/// Symbols ranked when `UNIVERSE` is not set.
pub const DEFAULT_UNIVERSE: [&str; 30] = [
    "AAPL", "MSFT", "TSLA", "NFLX", "GOOGL", "AMZN", "META", "NVDA", "INTC", "AMD", "PYPL", "ADBE",
    "CRM", "UBER", "LYFT", "SPOT", "SHOP", "SQ", "ZM", "DOCU", "MRNA", "RIOT", "AMC", "GME", "PLTR",
    "PLUG", "BBBY", "WISH", "CLOV", "SPCE",
];

#[derive(Debug, Clone)]
pub struct SnapshotEnvConfig {
    pub ttl: Duration,
    pub top_n: usize,
    pub universe: Vec<String>,
    pub fetch_concurrency: usize,
}

impl SnapshotEnvConfig {
    pub fn from_env() -> Result<Self> {
        let universe = match env::var("UNIVERSE") {
            Ok(list) => parse_symbol_list(&list),
            Err(_) => DEFAULT_UNIVERSE.iter().map(|s| s.to_string()).collect(),
        };
        if universe.is_empty() {
            anyhow::bail!("UNIVERSE must name at least one symbol");
        }

        let fetch_concurrency: usize = parse_env("FETCH_CONCURRENCY", 8)?;
        if fetch_concurrency == 0 {
            anyhow::bail!("FETCH_CONCURRENCY must be greater than 0");
        }

        Ok(Self {
            ttl: Duration::from_secs(parse_env("SNAPSHOT_TTL_SECS", 300)?),
            top_n: parse_env("SNAPSHOT_TOP_N", 20)?,
            universe,
            fetch_concurrency,
        })
    }
}
