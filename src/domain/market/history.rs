use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Number of daily points in a series (about six months of trading days).
pub const SERIES_LENGTH: usize = 126;

/// One daily bar as reported by a time-series provider, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl HistoricalPoint {
    /// High/low must bracket open and close, and all prices must be finite.
    pub fn is_consistent(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite())
            && self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }
}

impl From<DailyBar> for HistoricalPoint {
    fn from(bar: DailyBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Where a series came from. Not part of the serialized shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesProvenance {
    Upstream,
    Synthetic { reason: String },
}

impl SeriesProvenance {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upstream => "upstream",
            Self::Synthetic { .. } => "synthetic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub points: Vec<HistoricalPoint>,
    #[serde(skip)]
    pub provenance: SeriesProvenance,
}

impl HistoricalSeries {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.provenance, SeriesProvenance::Synthetic { .. })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Strictly increasing dates, trading days only, consistent OHLC.
    pub fn is_well_formed(&self) -> bool {
        self.points.iter().all(|p| is_trading_day(p.date) && p.is_consistent())
            && self.points.windows(2).all(|w| w[0].date < w[1].date)
    }
}

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
