use crate::application::market_data::ranker::Ranker;
use crate::application::market_data::universe_fetcher::UniverseFetcher;
use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::Snapshot;
use crate::infrastructure::observability::Metrics;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Default time a computed snapshot is served before it is recomputed.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Full ranking plus the instant it was stored. Swapped as one unit.
#[derive(Debug)]
struct CachedSnapshot {
    snapshot: Snapshot,
    stored_at: Instant,
}

/// TTL gate in front of the universe fetch and ranking.
///
/// A stored snapshot younger than the TTL is served as-is. An older one is
/// recomputed on demand by exactly one caller; callers arriving meanwhile wait
/// on `refresh_lock` and then share that refresh's outcome, failure included.
pub struct SnapshotCache {
    fetcher: Arc<UniverseFetcher>,
    ranker: Ranker,
    universe: Vec<String>,
    ttl: Duration,
    current: RwLock<Option<Arc<CachedSnapshot>>>,
    refresh_lock: Mutex<()>,
    /// Bumped when a refresh completes, whether it stored a snapshot or not.
    generation: AtomicU64,
    last_failure: RwLock<Option<MarketDataError>>,
    metrics: Option<Metrics>,
}

impl SnapshotCache {
    pub fn new(fetcher: Arc<UniverseFetcher>, universe: Vec<String>, ttl: Duration) -> Self {
        Self {
            fetcher,
            ranker: Ranker,
            universe,
            ttl,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            last_failure: RwLock::new(None),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// Top `top_n` gainers and losers, recomputing if the stored ranking is stale.
    ///
    /// Every `top_n` is served from the same stored ranking, so two calls
    /// inside one TTL window share a `computed_at` regardless of `top_n`.
    pub async fn get_snapshot(&self, top_n: usize) -> MarketDataResult<Snapshot> {
        let seen = self.generation.load(Ordering::Acquire);
        if let Some(cached) = self.fresh() {
            self.record("hit");
            return Ok(cached.snapshot.top(top_n));
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(cached) = self.fresh() {
            debug!("SnapshotCache: served by concurrent refresh");
            self.record("hit");
            return Ok(cached.snapshot.top(top_n));
        }
        if self.generation.load(Ordering::Acquire) != seen {
            if let Some(failure) = self.read_last_failure() {
                debug!("SnapshotCache: concurrent refresh failed, sharing its error");
                self.record("miss");
                return Err(failure);
            }
        }

        self.record("miss");
        let outcome = self.recompute().await;
        self.write_last_failure(outcome.as_ref().err().cloned());
        self.generation.fetch_add(1, Ordering::Release);

        Ok(outcome?.snapshot.top(top_n))
    }

    /// Last stored snapshot regardless of age.
    pub fn peek(&self) -> Option<Snapshot> {
        self.read_current().map(|cached| cached.snapshot.clone())
    }

    /// Drop the stored snapshot so the next request recomputes.
    pub fn invalidate(&self) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SnapshotCache: lock poisoned during invalidate, recovering");
                poisoned.into_inner()
            }
        };
        *guard = None;
    }

    fn fresh(&self) -> Option<Arc<CachedSnapshot>> {
        self.read_current()
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
    }

    fn read_current(&self) -> Option<Arc<CachedSnapshot>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                error!("SnapshotCache: lock poisoned during read, recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    fn read_last_failure(&self) -> Option<MarketDataError> {
        match self.last_failure.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                error!("SnapshotCache: failure lock poisoned during read, recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    fn write_last_failure(&self, failure: Option<MarketDataError>) {
        let mut guard = match self.last_failure.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SnapshotCache: failure lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        };
        *guard = failure;
    }

    async fn recompute(&self) -> MarketDataResult<Arc<CachedSnapshot>> {
        info!(
            "SnapshotCache: recomputing snapshot for {} symbols",
            self.universe.len()
        );

        let quotes = self.fetcher.fetch_quotes(&self.universe).await;
        if quotes.is_empty() && !self.universe.is_empty() {
            error!(
                "SnapshotCache: every symbol failed; keeping previous snapshot ({} attempted)",
                self.universe.len()
            );
            return Err(MarketDataError::UniverseUnavailable {
                attempted: self.universe.len(),
            });
        }

        let snapshot = self.ranker.rank_all(&quotes, Utc::now());
        let cached = Arc::new(CachedSnapshot {
            snapshot,
            stored_at: Instant::now(),
        });

        {
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    error!("SnapshotCache: lock poisoned during write, recovering");
                    poisoned.into_inner()
                }
            };
            *guard = Some(cached.clone());
        }

        if let Some(metrics) = &self.metrics {
            metrics.snapshot_recomputes_total.inc();
        }

        info!(
            "SnapshotCache: stored snapshot with {} ranked quotes",
            cached.snapshot.gainers.len()
        );
        Ok(cached)
    }

    fn record(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_snapshot_request(result);
        }
    }
}
