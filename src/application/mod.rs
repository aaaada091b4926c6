// Market data processing
pub mod market_data;

// Facade used by the CLI
pub mod service;
