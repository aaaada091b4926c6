use crate::application::market_data::synthetic::SyntheticSeriesGenerator;
use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::history::is_trading_day;
use crate::domain::market::symbol::normalize_symbol;
use crate::domain::market::{DailyBar, HistoricalPoint, HistoricalSeries, SeriesProvenance};
use crate::domain::ports::{OutputSize, TimeSeriesSource};
use crate::infrastructure::observability::Metrics;
use chrono::{NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Serves daily series for one symbol, falling back to a synthetic series
/// whenever the upstream provider cannot deliver a full one.
pub struct HistoricalSeriesProvider {
    source: Arc<dyn TimeSeriesSource>,
    generator: SyntheticSeriesGenerator,
    call_timeout: Duration,
    seed: Option<u64>,
    metrics: Option<Metrics>,
}

impl HistoricalSeriesProvider {
    pub fn new(source: Arc<dyn TimeSeriesSource>, call_timeout: Duration) -> Self {
        Self {
            source,
            generator: SyntheticSeriesGenerator::default(),
            call_timeout,
            seed: None,
            metrics: None,
        }
    }

    pub fn with_generator(mut self, generator: SyntheticSeriesGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Make synthetic output reproducible. The symbol is mixed into the seed
    /// so different tickers still get different walks.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn series_length(&self) -> usize {
        self.generator.length
    }

    /// Upstream series when available, synthetic series otherwise.
    ///
    /// Only an invalid symbol (rejected before any request) or a generator
    /// that cannot produce a full series is an error.
    pub async fn get_series(&self, symbol: &str) -> MarketDataResult<HistoricalSeries> {
        let symbol = normalize_symbol(symbol)?;

        let series = match self.fetch_upstream(&symbol).await {
            Ok(points) => {
                info!(
                    "HistoricalSeriesProvider: {} points for {} from {}",
                    points.len(),
                    symbol,
                    self.source.name()
                );
                HistoricalSeries {
                    symbol,
                    points,
                    provenance: SeriesProvenance::Upstream,
                }
            }
            Err(e) => {
                warn!(
                    "HistoricalSeriesProvider: falling back to synthetic series for {} ({}): {}",
                    symbol,
                    e.kind(),
                    e
                );
                self.synthesize(&symbol, Utc::now().date_naive(), e.to_string())?
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.inc_historical(series.provenance.label());
        }
        Ok(series)
    }

    /// Build the stand-in series for `symbol` ending no later than `today`.
    pub fn synthesize(
        &self,
        symbol: &str,
        today: NaiveDate,
        reason: String,
    ) -> MarketDataResult<HistoricalSeries> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(symbol_hash(symbol))),
            None => StdRng::from_os_rng(),
        };

        let points = self.generator.generate(symbol, today, &mut rng)?;
        if points.len() != self.generator.length {
            return Err(MarketDataError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!(
                    "synthetic series has {} points, expected {}",
                    points.len(),
                    self.generator.length
                ),
            });
        }

        Ok(HistoricalSeries {
            symbol: symbol.to_string(),
            points,
            provenance: SeriesProvenance::Synthetic { reason },
        })
    }

    async fn fetch_upstream(&self, symbol: &str) -> MarketDataResult<Vec<HistoricalPoint>> {
        let source = self.source.name();
        let started = Instant::now();

        let result = match tokio::time::timeout(
            self.call_timeout,
            self.source.fetch_daily_series(symbol, OutputSize::Full),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                symbol: symbol.to_string(),
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

        select_recent(symbol, result?, self.generator.length)
    }
}

/// Keep the `length` most recent usable bars, ascending by date.
///
/// Weekend rows and rows whose high/low do not bracket open/close are
/// skipped; a duplicated date keeps the last row seen. Fewer than `length`
/// usable rows is an error so the caller can fall back.
pub fn select_recent(
    symbol: &str,
    bars: Vec<DailyBar>,
    length: usize,
) -> MarketDataResult<Vec<HistoricalPoint>> {
    let total = bars.len();
    let mut by_date: BTreeMap<NaiveDate, HistoricalPoint> = BTreeMap::new();

    for bar in bars {
        let point = HistoricalPoint::from(bar);
        if is_trading_day(point.date) && point.is_consistent() {
            by_date.insert(point.date, point);
        }
    }

    if by_date.len() < total {
        debug!(
            "HistoricalSeriesProvider: {} of {} rows for {} skipped",
            total - by_date.len(),
            total,
            symbol
        );
    }

    if by_date.len() < length {
        return Err(MarketDataError::malformed(
            symbol,
            format!(
                "only {} usable trading days, need {}",
                by_date.len(),
                length
            ),
        ));
    }

    let skip = by_date.len() - length;
    Ok(by_date.into_values().skip(skip).collect())
}

fn symbol_hash(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}
