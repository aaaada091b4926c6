use crate::application::market_data::historical::HistoricalSeriesProvider;
use crate::application::market_data::snapshot_cache::SnapshotCache;
use crate::application::market_data::universe_fetcher::UniverseFetcher;
use crate::application::service::MarketDataService;
use crate::config::{Config, Mode};
use crate::domain::ports::{QuoteSource, TimeSeriesSource};
use crate::infrastructure::alpha_vantage::AlphaVantageTimeSeries;
use crate::infrastructure::core::{HttpClientFactory, HttpClientSettings};
use crate::infrastructure::mock::{MockQuoteSource, MockTimeSeriesSource};
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::yahoo::YahooQuoteSource;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Seed for mock quotes when `SYNTHETIC_SEED` is unset
const DEFAULT_MOCK_SEED: u64 = 7;

pub struct ServiceFactory;

impl ServiceFactory {
    /// Quote and time-series sources for the configured mode.
    pub fn create_sources(
        config: &Config,
    ) -> Result<(Arc<dyn QuoteSource>, Arc<dyn TimeSeriesSource>)> {
        match config.mode {
            Mode::Mock => {
                let seed = config.history.synthetic_seed.unwrap_or(DEFAULT_MOCK_SEED);
                info!("ServiceFactory: using mock sources (seed {})", seed);
                let quotes: Arc<dyn QuoteSource> =
                    Arc::new(MockQuoteSource::demo(&config.snapshot.universe, seed));
                let series: Arc<dyn TimeSeriesSource> = Arc::new(MockTimeSeriesSource::new());
                Ok((quotes, series))
            }
            Mode::Live => {
                let providers = &config.providers;
                let client = HttpClientFactory::create_client(&HttpClientSettings {
                    timeout: providers.timeout,
                    max_retries: providers.max_retries,
                    user_agent: providers.yahoo.user_agent.clone(),
                })?;

                info!(
                    "ServiceFactory: using live sources ({}, {})",
                    providers.yahoo.base_url, providers.alpha_vantage.base_url
                );
                let quotes: Arc<dyn QuoteSource> = Arc::new(YahooQuoteSource::new(
                    client.clone(),
                    providers.yahoo.base_url.clone(),
                    providers.timeout,
                ));
                let series: Arc<dyn TimeSeriesSource> = Arc::new(AlphaVantageTimeSeries::new(
                    client,
                    providers.alpha_vantage.base_url.clone(),
                    providers.alpha_vantage.api_key.clone(),
                    providers.timeout,
                ));
                Ok((quotes, series))
            }
        }
    }

    /// Wire the full service from configuration.
    pub fn create_service(config: &Config, metrics: Option<Metrics>) -> Result<MarketDataService> {
        let (quotes, series) = Self::create_sources(config)?;
        Ok(Self::assemble(config, quotes, series, metrics))
    }

    /// Wire the service around explicit sources.
    pub fn assemble(
        config: &Config,
        quotes: Arc<dyn QuoteSource>,
        series: Arc<dyn TimeSeriesSource>,
        metrics: Option<Metrics>,
    ) -> MarketDataService {
        let call_timeout = call_budget(config.providers.timeout, config.providers.max_retries);

        let mut fetcher = UniverseFetcher::new(
            quotes,
            config.snapshot.fetch_concurrency,
            call_timeout,
        );
        let mut history = HistoricalSeriesProvider::new(series, call_timeout)
            .with_generator(config.history.generator())
            .with_seed(config.history.synthetic_seed);

        if let Some(metrics) = &metrics {
            fetcher = fetcher.with_metrics(metrics.clone());
            history = history.with_metrics(metrics.clone());
        }

        let fetcher = Arc::new(fetcher);
        let mut snapshots = SnapshotCache::new(
            fetcher.clone(),
            config.snapshot.universe.clone(),
            config.snapshot.ttl,
        );
        if let Some(metrics) = metrics {
            snapshots = snapshots.with_metrics(metrics);
        }

        MarketDataService::new(fetcher, snapshots, history)
            .with_default_top_n(config.snapshot.top_n)
    }
}

/// Outer bound on one logical upstream call: every retry attempt gets the
/// full per-attempt timeout.
fn call_budget(timeout: Duration, max_retries: u32) -> Duration {
    timeout.saturating_mul(max_retries.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_budget_covers_retries() {
        assert_eq!(
            call_budget(Duration::from_secs(10), 2),
            Duration::from_secs(30)
        );
        assert_eq!(
            call_budget(Duration::from_secs(10), 0),
            Duration::from_secs(10)
        );
    }
}
