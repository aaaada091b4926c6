use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::{DailyBar, RawQuote};
use crate::domain::ports::{OutputSize, QuoteSource, TimeSeriesSource};
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

const DEMO_SECTORS: [&str; 6] = [
    "Technology",
    "Consumer Cyclical",
    "Communication Services",
    "Healthcare",
    "Financial Services",
    "Energy",
];

#[derive(Default)]
struct Scripted<T> {
    responses: HashMap<String, MarketDataResult<T>>,
    delays: HashMap<String, Duration>,
    calls: HashMap<String, usize>,
}

impl<T: Clone> Scripted<T> {
    /// Record the call and return the scripted delay and response.
    fn take(&mut self, symbol: &str) -> (Option<Duration>, Option<MarketDataResult<T>>) {
        *self.calls.entry(symbol.to_string()).or_default() += 1;
        (
            self.delays.get(symbol).copied(),
            self.responses.get(symbol).cloned(),
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory quote provider with scripted answers, delays and call counts.
///
/// Symbols without a scripted answer are `NotFound`.
#[derive(Default)]
pub struct MockQuoteSource {
    state: Mutex<Scripted<RawQuote>>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic quotes for every symbol in `universe`, used by mock mode.
    pub fn demo(universe: &[String], seed: u64) -> Self {
        let source = Self::new();
        for (idx, symbol) in universe.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(idx as u64));
            source.set_quote(symbol, demo_quote(symbol, idx, &mut rng));
        }
        info!(
            "MockQuoteSource: seeded {} demo quotes (seed {})",
            universe.len(),
            seed
        );
        source
    }

    pub fn with_quote(self, symbol: &str, quote: RawQuote) -> Self {
        self.set_quote(symbol, quote);
        self
    }

    pub fn with_error(self, symbol: &str, error: MarketDataError) -> Self {
        self.set_error(symbol, error);
        self
    }

    pub fn with_delay(self, symbol: &str, delay: Duration) -> Self {
        lock(&self.state).delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn set_quote(&self, symbol: &str, quote: RawQuote) {
        lock(&self.state)
            .responses
            .insert(symbol.to_string(), Ok(quote));
    }

    pub fn set_error(&self, symbol: &str, error: MarketDataError) {
        lock(&self.state)
            .responses
            .insert(symbol.to_string(), Err(error));
    }

    pub fn calls_for(&self, symbol: &str) -> usize {
        lock(&self.state).calls.get(symbol).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.state).calls.values().sum()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_quote(&self, symbol: &str) -> MarketDataResult<RawQuote> {
        let (delay, response) = lock(&self.state).take(symbol);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        debug!("MockQuoteSource: quote for {}", symbol);
        response.unwrap_or_else(|| Err(MarketDataError::not_found(symbol)))
    }
}

fn demo_quote(symbol: &str, idx: usize, rng: &mut StdRng) -> RawQuote {
    let previous_close: f64 = rng.random_range(5.0..500.0);
    let change_percent: f64 = rng.random_range(-12.0..12.0);
    let price = previous_close * (1.0 + change_percent / 100.0);
    let shares: u64 = rng.random_range(50_000_000..5_000_000_000);
    let eps: f64 = rng.random_range(-2.0..12.0);

    RawQuote {
        price: Some(price),
        previous_close: Some(previous_close),
        change: Some(price - previous_close),
        change_percent: Some(change_percent),
        volume: Some(rng.random_range(100_000..80_000_000)),
        market_cap: Some((price * shares as f64) as u64),
        sector: Some(DEMO_SECTORS[idx % DEMO_SECTORS.len()].to_string()),
        long_name: Some(format!("{} Holdings", symbol)),
        market_time: Some(Utc::now().timestamp()),
        trailing_pe: (eps > 0.0).then(|| price / eps),
        trailing_eps: Some(eps),
        beta: Some(rng.random_range(0.3..2.5)),
        fifty_two_week_high: Some(price * rng.random_range(1.05..1.8)),
        fifty_two_week_low: Some(price * rng.random_range(0.4..0.95)),
        target_mean_price: Some(price * rng.random_range(0.8..1.4)),
        ..Default::default()
    }
}

/// In-memory daily-series provider. Symbols without a scripted series answer
/// `MalformedResponse`, the same shape a provider error page produces.
#[derive(Default)]
pub struct MockTimeSeriesSource {
    state: Mutex<Scripted<Vec<DailyBar>>>,
}

impl MockTimeSeriesSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        lock(&self.state)
            .responses
            .insert(symbol.to_string(), Ok(bars));
        self
    }

    pub fn with_error(self, symbol: &str, error: MarketDataError) -> Self {
        lock(&self.state)
            .responses
            .insert(symbol.to_string(), Err(error));
        self
    }

    pub fn with_delay(self, symbol: &str, delay: Duration) -> Self {
        lock(&self.state).delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn calls_for(&self, symbol: &str) -> usize {
        lock(&self.state).calls.get(symbol).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.state).calls.values().sum()
    }
}

#[async_trait]
impl TimeSeriesSource for MockTimeSeriesSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        _output_size: OutputSize,
    ) -> MarketDataResult<Vec<DailyBar>> {
        let (delay, response) = lock(&self.state).take(symbol);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response.unwrap_or_else(|| Err(MarketDataError::malformed(symbol, "no time series")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_symbol_not_found() {
        let source = MockQuoteSource::new();
        let result = source.fetch_quote("NOPE").await;
        assert_eq!(result, Err(MarketDataError::not_found("NOPE")));
        assert_eq!(source.calls_for("NOPE"), 1);
    }

    #[tokio::test]
    async fn test_demo_quotes_are_deterministic() {
        let universe = vec!["AAPL".to_string(), "MSFT".to_string()];
        let a = MockQuoteSource::demo(&universe, 9);
        let b = MockQuoteSource::demo(&universe, 9);

        let qa = a.fetch_quote("MSFT").await.unwrap();
        let qb = b.fetch_quote("MSFT").await.unwrap();
        assert_eq!(qa.price, qb.price);
        assert_eq!(qa.change_percent, qb.change_percent);
        assert!(qa.has_market_fields());
        assert!(qa.has_fundamental_fields());
    }

    #[tokio::test]
    async fn test_time_series_default_is_malformed() {
        let source = MockTimeSeriesSource::new();
        let result = source.fetch_daily_series("AAPL", OutputSize::Full).await;
        assert!(matches!(
            result,
            Err(MarketDataError::MalformedResponse { .. })
        ));
    }
}
