// Market data domain
pub mod history;
pub mod quote;
pub mod snapshot;
pub mod symbol;

pub use history::{DailyBar, HistoricalPoint, HistoricalSeries, SERIES_LENGTH, SeriesProvenance};
pub use quote::{Fundamentals, Quote, RawQuote};
pub use snapshot::Snapshot;
