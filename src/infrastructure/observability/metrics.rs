//! Prometheus metrics definitions for marketscope
//!
//! All metrics use the `marketscope_` prefix and are read-only.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the market data layer
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Upstream calls by source and outcome (ok / error kind)
    pub upstream_requests_total: CounterVec,
    /// Snapshot requests by result (hit/miss)
    pub snapshot_requests_total: CounterVec,
    /// Completed universe recomputations
    pub snapshot_recomputes_total: IntCounter,
    /// Historical series served, by provenance
    pub historical_series_total: CounterVec,
    /// Upstream latency in seconds
    pub upstream_latency_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new Metrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let upstream_requests_total = CounterVec::new(
            Opts::new(
                "marketscope_upstream_requests_total",
                "Upstream provider calls by source and outcome",
            ),
            &["source", "outcome"],
        )?;
        registry.register(Box::new(upstream_requests_total.clone()))?;

        let snapshot_requests_total = CounterVec::new(
            Opts::new(
                "marketscope_snapshot_requests_total",
                "Snapshot requests by cache result",
            ),
            &["result"],
        )?;
        registry.register(Box::new(snapshot_requests_total.clone()))?;

        let snapshot_recomputes_total = IntCounter::with_opts(Opts::new(
            "marketscope_snapshot_recomputes_total",
            "Universe fetch + rank recomputations",
        ))?;
        registry.register(Box::new(snapshot_recomputes_total.clone()))?;

        let historical_series_total = CounterVec::new(
            Opts::new(
                "marketscope_historical_series_total",
                "Historical series served by provenance",
            ),
            &["provenance"],
        )?;
        registry.register(Box::new(historical_series_total.clone()))?;

        let upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "marketscope_upstream_latency_seconds",
                "Upstream request latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["source"],
        )?;
        registry.register(Box::new(upstream_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            upstream_requests_total,
            snapshot_requests_total,
            snapshot_recomputes_total,
            historical_series_total,
            upstream_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_upstream(&self, source: &str, outcome: &str) {
        self.upstream_requests_total
            .with_label_values(&[source, outcome])
            .inc();
    }

    pub fn observe_upstream_latency(&self, source: &str, seconds: f64) {
        self.upstream_latency_seconds
            .with_label_values(&[source])
            .observe(seconds);
    }

    pub fn inc_snapshot_request(&self, result: &str) {
        self.snapshot_requests_total
            .with_label_values(&[result])
            .inc();
    }

    pub fn inc_historical(&self, provenance: &str) {
        self.historical_series_total
            .with_label_values(&[provenance])
            .inc();
    }
}
