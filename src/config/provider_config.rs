//! Upstream provider configuration parsing from environment variables.

use super::parse_env;
use anyhow::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; marketscope/0.1)";

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Provider environment configuration
#[derive(Debug, Clone)]
pub struct ProviderEnvConfig {
    pub yahoo: YahooConfig,
    pub alpha_vantage: AlphaVantageConfig,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl ProviderEnvConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_secs: u64 = parse_env("UPSTREAM_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than 0");
        }

        Ok(Self {
            yahoo: YahooConfig {
                base_url: env::var("YAHOO_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_YAHOO_BASE_URL.to_string()),
                user_agent: env::var("YAHOO_USER_AGENT")
                    .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            },
            alpha_vantage: AlphaVantageConfig {
                base_url: env::var("ALPHA_VANTAGE_URL")
                    .unwrap_or_else(|_| DEFAULT_ALPHA_VANTAGE_URL.to_string()),
                api_key: env::var("ALPHA_VANTAGE_API_KEY").unwrap_or_else(|_| "demo".to_string()),
            },
            timeout: Duration::from_secs(timeout_secs),
            max_retries: parse_env("UPSTREAM_MAX_RETRIES", 2)?,
        })
    }
}
