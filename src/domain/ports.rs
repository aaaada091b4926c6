use crate::domain::errors::MarketDataResult;
use crate::domain::market::{DailyBar, RawQuote};
use async_trait::async_trait;

/// How much history to request from a time-series provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    /// Most recent ~100 points
    Compact,
    /// Full available history
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

// Need async_trait for async functions in traits
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Fetch the raw field bag for one already-normalized symbol.
    ///
    /// An empty upstream answer is `NotFound`; transport problems are
    /// `UpstreamUnavailable`/`Timeout`; undecodable bodies are `MalformedResponse`.
    async fn fetch_quote(&self, symbol: &str) -> MarketDataResult<RawQuote>;
}

#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily bars in any order. A response without a time-series section is
    /// `MalformedResponse`.
    async fn fetch_daily_series(
        &self,
        symbol: &str,
        output_size: OutputSize,
    ) -> MarketDataResult<Vec<DailyBar>>;
}
