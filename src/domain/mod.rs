// Domain-specific error types
pub mod errors;

// Quotes, fundamentals, snapshots and daily series
pub mod market;

// Port interfaces
pub mod ports;
