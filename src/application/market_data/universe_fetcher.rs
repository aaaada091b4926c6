use crate::application::market_data::normalizer::normalize_quote;
use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::symbol::normalize_symbol;
use crate::domain::market::{Quote, RawQuote};
use crate::domain::ports::QuoteSource;
use crate::infrastructure::observability::Metrics;
use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of fetching one symbol: the symbol it was requested as, and either
/// the normalized quote or the reason it was dropped.
pub type SymbolOutcome = (String, MarketDataResult<Quote>);

/// Fetches and normalizes quotes for a list of symbols.
///
/// Every upstream call is bounded by `call_timeout`; at most `concurrency`
/// calls are in flight at once. One symbol failing never affects the others.
pub struct UniverseFetcher {
    source: Arc<dyn QuoteSource>,
    concurrency: usize,
    call_timeout: Duration,
    metrics: Option<Metrics>,
}

impl UniverseFetcher {
    pub fn new(source: Arc<dyn QuoteSource>, concurrency: usize, call_timeout: Duration) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            call_timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Raw upstream payload for one symbol, after validation and timeout.
    pub async fn fetch_raw(&self, symbol: &str) -> MarketDataResult<(String, RawQuote)> {
        let symbol = normalize_symbol(symbol)?;
        let source = self.source.name();
        let started = Instant::now();

        let result = match tokio::time::timeout(self.call_timeout, self.source.fetch_quote(&symbol))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                symbol: symbol.clone(),
                duration_ms: self.call_timeout.as_millis() as u64,
            }),
        };

        if let Some(metrics) = &self.metrics {
            metrics.observe_upstream_latency(source, started.elapsed().as_secs_f64());
            let outcome = match &result {
                Ok(_) => "ok",
                Err(e) => e.kind(),
            };
            metrics.inc_upstream(source, outcome);
        }

        result.map(|raw| (symbol, raw))
    }

    /// One normalized quote, or a tagged error.
    pub async fn fetch_one(&self, symbol: &str) -> MarketDataResult<Quote> {
        let (symbol, raw) = self.fetch_raw(symbol).await?;
        normalize_quote(&symbol, &raw)
    }

    /// Per-symbol outcomes in request order, each distinct symbol once.
    pub async fn fetch_outcomes(&self, symbols: &[String]) -> Vec<SymbolOutcome> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = symbols
            .iter()
            .map(|s| normalize_symbol(s).unwrap_or_else(|_| s.trim().to_uppercase()))
            .filter(|s| seen.insert(s.clone()))
            .collect();

        debug!(
            "UniverseFetcher: fetching {} symbols from {} (concurrency {})",
            unique.len(),
            self.source.name(),
            self.concurrency
        );

        let this = self;
        let mut outcomes: Vec<(usize, SymbolOutcome)> = stream::iter(unique.into_iter().enumerate())
            .map(move |(idx, symbol)| async move {
                let result = this.fetch_one(&symbol).await;
                (idx, (symbol, result))
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // Completion order is arbitrary; restore request order
        outcomes.sort_by_key(|(idx, _)| *idx);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Successfully normalized quotes in request order. Failures are logged
    /// and dropped; an all-failed batch yields an empty list.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> Vec<Quote> {
        let outcomes = self.fetch_outcomes(symbols).await;
        let attempted = outcomes.len();

        let quotes: Vec<Quote> = outcomes
            .into_iter()
            .filter_map(|(symbol, result)| match result {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warn!(
                        "UniverseFetcher: dropping {} ({}): {}",
                        symbol,
                        e.kind(),
                        e
                    );
                    None
                }
            })
            .collect();

        info!(
            "UniverseFetcher: {}/{} symbols fetched successfully",
            quotes.len(),
            attempted
        );
        quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockQuoteSource;

    fn raw(pct: f64) -> RawQuote {
        RawQuote {
            price: Some(100.0),
            change_percent: Some(pct),
            change: Some(pct),
            ..Default::default()
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_abort_batch() {
        let source = MockQuoteSource::new()
            .with_quote("AAPL", raw(1.0))
            .with_error("MSFT", MarketDataError::upstream("MSFT", "503"))
            .with_quote("TSLA", raw(-2.0));
        let fetcher = UniverseFetcher::new(Arc::new(source), 4, Duration::from_secs(1));

        let quotes = fetcher.fetch_quotes(&symbols(&["AAPL", "MSFT", "TSLA"])).await;
        let got: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(got, vec!["AAPL", "TSLA"]);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_list() {
        let source = MockQuoteSource::new();
        let fetcher = UniverseFetcher::new(Arc::new(source), 4, Duration::from_secs(1));
        let quotes = fetcher.fetch_quotes(&symbols(&["AAA", "BBB"])).await;
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_fetched_once() {
        let source = Arc::new(MockQuoteSource::new().with_quote("AAPL", raw(1.0)));
        let fetcher = UniverseFetcher::new(source.clone(), 4, Duration::from_secs(1));
        let quotes = fetcher
            .fetch_quotes(&symbols(&["AAPL", "aapl", " AAPL "]))
            .await;
        assert_eq!(quotes.len(), 1);
        assert_eq!(source.calls_for("AAPL"), 1);
    }

    #[tokio::test]
    async fn test_invalid_symbol_never_reaches_upstream() {
        let source = Arc::new(MockQuoteSource::new());
        let fetcher = UniverseFetcher::new(source.clone(), 4, Duration::from_secs(1));
        let outcomes = fetcher.fetch_outcomes(&symbols(&["BAD SYMBOL"])).await;
        assert!(matches!(
            outcomes[0].1,
            Err(MarketDataError::InvalidInput { .. })
        ));
        assert_eq!(source.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_symbol_times_out() {
        let source = MockQuoteSource::new()
            .with_quote("FAST", raw(1.0))
            .with_quote("SLOW", raw(2.0))
            .with_delay("SLOW", Duration::from_secs(30));
        let fetcher = UniverseFetcher::new(Arc::new(source), 4, Duration::from_secs(10));

        let outcomes = fetcher.fetch_outcomes(&symbols(&["SLOW", "FAST"])).await;
        assert_eq!(outcomes[0].0, "SLOW");
        assert_eq!(
            outcomes[0].1,
            Err(MarketDataError::Timeout {
                symbol: "SLOW".into(),
                duration_ms: 10_000
            })
        );
        assert!(outcomes[1].1.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_keep_request_order_despite_completion_order() {
        let source = MockQuoteSource::new()
            .with_quote("A", raw(1.0))
            .with_quote("B", raw(2.0))
            .with_quote("C", raw(3.0))
            .with_delay("A", Duration::from_millis(300))
            .with_delay("B", Duration::from_millis(200))
            .with_delay("C", Duration::from_millis(100));
        let fetcher = UniverseFetcher::new(Arc::new(source), 3, Duration::from_secs(1));

        let quotes = fetcher.fetch_quotes(&symbols(&["A", "B", "C"])).await;
        let got: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(got, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_metrics_record_outcomes() {
        let metrics = Metrics::new().unwrap();
        let source = MockQuoteSource::new().with_quote("AAPL", raw(1.0));
        let fetcher = UniverseFetcher::new(Arc::new(source), 2, Duration::from_secs(1))
            .with_metrics(metrics.clone());

        fetcher.fetch_quotes(&symbols(&["AAPL", "NOPE"])).await;
        let output = metrics.render();
        assert!(output.contains("outcome=\"ok\""));
        assert!(output.contains("outcome=\"not_found\""));
    }
}
