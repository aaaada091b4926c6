pub mod common;
pub mod quote_source;

pub use quote_source::YahooQuoteSource;
