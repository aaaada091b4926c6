use thiserror::Error;

/// Errors related to market data retrieval and normalization
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketDataError {
    #[error("Invalid symbol '{symbol}': {reason}")]
    InvalidInput { symbol: String, reason: String },

    #[error("No data available for {symbol}")]
    NotFound { symbol: String },

    #[error("Upstream unavailable for {symbol}: {reason}")]
    UpstreamUnavailable { symbol: String, reason: String },

    #[error("Upstream call for {symbol} timed out after {duration_ms}ms")]
    Timeout { symbol: String, duration_ms: u64 },

    #[error("Malformed response for {symbol}: {reason}")]
    MalformedResponse { symbol: String, reason: String },

    #[error("Historical data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("No quotes could be fetched for the universe ({attempted} symbols attempted)")]
    UniverseUnavailable { attempted: usize },
}

impl MarketDataError {
    pub fn upstream(symbol: &str, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(symbol: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(symbol: &str) -> Self {
        Self::NotFound {
            symbol: symbol.to_string(),
        }
    }

    /// True for failures of the provider itself (network, timeout, bad payload).
    ///
    /// These are recovered locally: a batch drops the symbol, the historical
    /// path switches to synthetic data.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::Timeout { .. } | Self::MalformedResponse { .. }
        )
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::UniverseUnavailable { .. } => "universe_unavailable",
        }
    }
}

pub type MarketDataResult<T> = std::result::Result<T, MarketDataError>;
