//! Prometheus metrics definitions for perfpulse
//!
//! All metrics use the `perfpulse_` prefix and are read-only.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the analytics engine
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Valid samples aggregated, per variant
    pub samples_processed_total: CounterVec,
    /// Valid samples outside every histogram bin, per variant
    pub samples_uncovered_total: CounterVec,
    /// Payloads served from fallback values, by reason
    pub fallback_payloads_total: CounterVec,
    /// Sample source fetch latency in seconds
    pub source_fetch_seconds: HistogramVec,
    /// Revenue projections by mode and validity
    pub revenue_projections_total: CounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with all counters and histograms registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let samples_processed_total = CounterVec::new(
            Opts::new(
                "perfpulse_samples_processed_total",
                "Valid samples aggregated per variant",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(samples_processed_total.clone()))?;

        let samples_uncovered_total = CounterVec::new(
            Opts::new(
                "perfpulse_samples_uncovered_total",
                "Valid samples outside every histogram bin",
            ),
            &["variant"],
        )?;
        registry.register(Box::new(samples_uncovered_total.clone()))?;

        let fallback_payloads_total = CounterVec::new(
            Opts::new(
                "perfpulse_fallback_payloads_total",
                "Payloads built from fallback values",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(fallback_payloads_total.clone()))?;

        let source_fetch_seconds = HistogramVec::new(
            HistogramOpts::new(
                "perfpulse_source_fetch_seconds",
                "Sample source fetch latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["source"],
        )?;
        registry.register(Box::new(source_fetch_seconds.clone()))?;

        let revenue_projections_total = CounterVec::new(
            Opts::new(
                "perfpulse_revenue_projections_total",
                "Revenue projections by mode and validity",
            ),
            &["mode", "valid"],
        )?;
        registry.register(Box::new(revenue_projections_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            samples_processed_total,
            samples_uncovered_total,
            fallback_payloads_total,
            source_fetch_seconds,
            revenue_projections_total,
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

    pub fn add_processed(&self, variant: &str, count: usize) {
        self.samples_processed_total
            .with_label_values(&[variant])
            .inc_by(count as f64);
    }

    pub fn add_uncovered(&self, variant: &str, count: usize) {
        self.samples_uncovered_total
            .with_label_values(&[variant])
            .inc_by(count as f64);
    }

    pub fn inc_fallback(&self, reason: &str) {
        self.fallback_payloads_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn observe_fetch(&self, source: &str, seconds: f64) {
        self.source_fetch_seconds
            .with_label_values(&[source])
            .observe(seconds);
    }

    pub fn inc_projection(&self, mode: &str, valid: bool) {
        let valid = if valid { "true" } else { "false" };
        self.revenue_projections_total
            .with_label_values(&[mode, valid])
            .inc();
    }
}
