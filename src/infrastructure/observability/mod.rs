//! Push-based observability for perfpulse
//!
//! Metrics are collected in a Prometheus registry and rendered in the text
//! exposition format on demand. Nothing here listens for requests.

pub mod metrics;

pub use metrics::Metrics;
