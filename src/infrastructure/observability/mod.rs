//! Push-based observability for marketscope
//!
//! Metrics are collected in a process-local Prometheus registry and rendered
//! on demand in the text exposition format. Nothing listens for requests.

pub mod metrics;

pub use metrics::Metrics;
