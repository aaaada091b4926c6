use crate::application::market_data::historical::HistoricalSeriesProvider;
use crate::application::market_data::normalizer::normalize_fundamentals;
use crate::application::market_data::snapshot_cache::SnapshotCache;
use crate::application::market_data::universe_fetcher::{SymbolOutcome, UniverseFetcher};
use crate::domain::errors::MarketDataResult;
use crate::domain::market::{Fundamentals, HistoricalSeries, Quote, Snapshot};
use std::sync::Arc;
use tracing::info;

/// Read-side entry point over the quote pipeline, the snapshot cache and
/// the historical provider.
pub struct MarketDataService {
    fetcher: Arc<UniverseFetcher>,
    snapshots: SnapshotCache,
    history: HistoricalSeriesProvider,
    default_top_n: usize,
}

impl MarketDataService {
    pub fn new(
        fetcher: Arc<UniverseFetcher>,
        snapshots: SnapshotCache,
        history: HistoricalSeriesProvider,
    ) -> Self {
        Self {
            fetcher,
            snapshots,
            history,
            default_top_n: 20,
        }
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    pub fn snapshot_cache(&self) -> &SnapshotCache {
        &self.snapshots
    }

    /// Gainers and losers, `top_n` each (configured default when `None`).
    pub async fn get_snapshot(&self, top_n: Option<usize>) -> MarketDataResult<Snapshot> {
        self.snapshots
            .get_snapshot(top_n.unwrap_or(self.default_top_n))
            .await
    }

    pub async fn get_quote(&self, symbol: &str) -> MarketDataResult<Quote> {
        self.fetcher.fetch_one(symbol).await
    }

    /// One outcome per distinct symbol, in request order.
    pub async fn get_quotes(&self, symbols: &[String]) -> Vec<SymbolOutcome> {
        self.fetcher.fetch_outcomes(symbols).await
    }

    pub async fn get_fundamentals(&self, symbol: &str) -> MarketDataResult<Fundamentals> {
        let (symbol, raw) = self.fetcher.fetch_raw(symbol).await?;
        let fundamentals = normalize_fundamentals(&symbol, &raw)?;
        info!("MarketDataService: fundamentals loaded for {}", symbol);
        Ok(fundamentals)
    }

    pub async fn get_historical_series(&self, symbol: &str) -> MarketDataResult<HistoricalSeries> {
        self.history.get_series(symbol).await
    }
}
