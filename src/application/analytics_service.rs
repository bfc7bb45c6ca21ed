use crate::config::AnalyticsConfig;
use crate::domain::analytics::{
    AnalyticsPayload, ProjectionMode, RevenueProjection, RevenueScenario, Sample,
    SampleQuery, Variant, project,
};
use crate::domain::errors::SampleSourceError;
use crate::domain::ports::SampleSource;
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Request-level entry point: fetches samples, aggregates them and projects revenue.
///
/// Every method degrades to a renderable result; nothing here returns an error
/// to the dashboard.
pub struct AnalyticsService {
    source: Option<Arc<dyn SampleSource>>,
    config: AnalyticsConfig,
    metrics: Option<Metrics>,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn SampleSource>, config: AnalyticsConfig) -> Self {
        Self {
            source: Some(source),
            config,
            metrics: None,
        }
    }

    /// Service for revenue projections only; `build_payload` always falls back.
    pub fn calculator(config: AnalyticsConfig) -> Self {
        Self {
            source: None,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Builds the display payload for `query`.
    ///
    /// A source timeout or error yields the fallback payload instead of a failure.
    pub async fn build_payload(&self, query: &SampleQuery) -> AnalyticsPayload {
        let Some(source) = &self.source else {
            warn!("AnalyticsService: no sample source configured for {}", query.tenant);
            return self.fallback("no_source", "No sample source configured".to_string());
        };

        let timeout = self.config.source.timeout();
        let started = Instant::now();
        let fetched = tokio::time::timeout(timeout, source.fetch_samples(query)).await;

        if let Some(metrics) = &self.metrics {
            metrics.observe_fetch(source.name(), started.elapsed().as_secs_f64());
        }

        match fetched {
            Ok(Ok(samples)) => {
                info!(
                    "AnalyticsService: {} samples from {} for {} ({})",
                    samples.len(),
                    source.name(),
                    query.tenant,
                    query.metric
                );
                self.aggregate(samples).await
            }
            Ok(Err(e)) => {
                warn!(
                    "AnalyticsService: {} source failed for {}: {:#}",
                    source.name(),
                    query.tenant,
                    e
                );
                self.fallback("source_error", format!("{:#}", e))
            }
            Err(_) => {
                let error = SampleSourceError::Timeout {
                    duration_ms: timeout.as_millis() as u64,
                };
                warn!("AnalyticsService: {} for {}", error, query.tenant);
                self.fallback("timeout", error.to_string())
            }
        }
    }

    async fn aggregate(&self, samples: Vec<Sample>) -> AnalyticsPayload {
        let layout = self.config.histogram.layout.clone();
        let expected = self.config.histogram.expected_rates.clone();
        let fallback = self.config.fallback.profile();

        let joined = tokio::task::spawn_blocking(move || {
            AnalyticsPayload::aggregate(&samples, &layout, expected.as_ref(), &fallback)
        })
        .await;

        let payload = match joined {
            Ok(payload) => payload,
            Err(e) => {
                warn!("AnalyticsService: aggregation task failed: {}", e);
                return self.fallback("aggregation_failed", e.to_string());
            }
        };

        for (variant, uncovered) in payload.uncovered() {
            if uncovered > 0 {
                warn!(
                    "AnalyticsService: {} {} samples outside histogram range [{}, {}] were dropped",
                    uncovered,
                    variant,
                    self.config.histogram.layout.min(),
                    self.config.histogram.layout.max()
                );
            }
        }

        if let Some(metrics) = &self.metrics {
            for variant in Variant::ALL {
                let histogram = &payload.variant(variant).histogram;
                metrics.add_processed(variant.as_str(), histogram.total + histogram.uncovered);
                metrics.add_uncovered(variant.as_str(), histogram.uncovered);
            }
        }

        debug!(
            "AnalyticsService: payload ready (baseline {:.2}%, optimized {:.2}%)",
            payload.baseline.average_conversion_rate, payload.optimized.average_conversion_rate
        );
        payload
    }

    fn fallback(&self, reason_label: &str, reason: String) -> AnalyticsPayload {
        if let Some(metrics) = &self.metrics {
            metrics.inc_fallback(reason_label);
        }
        AnalyticsPayload::fallback(
            &self.config.histogram.layout,
            &self.config.fallback.profile(),
            reason,
        )
    }

    /// Calculator entry point, independent of any sample fetch.
    pub fn project_revenue(&self, scenario: &RevenueScenario) -> RevenueProjection {
        let projection = project(scenario);

        match &projection.invalid_reason {
            Some(reason) => warn!("AnalyticsService: revenue scenario rejected: {}", reason),
            None => debug!(
                "AnalyticsService: {:?} projection boost {}",
                scenario.mode, projection.boost
            ),
        }
        if let Some(metrics) = &self.metrics {
            let mode = match scenario.mode {
                ProjectionMode::Forward => "forward",
                ProjectionMode::Inverse => "inverse",
            };
            metrics.inc_projection(mode, projection.valid);
        }
        projection
    }

    /// Inverse projection from the uplift measured in a live payload.
    ///
    /// `None` for fallback payloads or when the baseline arm has no conversions.
    pub fn project_observed(
        &self,
        payload: &AnalyticsPayload,
        monthly_visitors: f64,
        average_order_value: f64,
    ) -> Option<RevenueProjection> {
        let scenario =
            RevenueScenario::from_payload(monthly_visitors, average_order_value, payload)?;
        Some(self.project_revenue(&scenario))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{Metric, PayloadOrigin};
    use anyhow::Result;
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    struct FixedSource(Vec<Sample>);

    #[async_trait]
    impl SampleSource for FixedSource {
        async fn fetch_samples(&self, _query: &SampleQuery) -> Result<Vec<Sample>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn query() -> SampleQuery {
        SampleQuery::try_last_days("shop.example", 7, Metric::Lcp).unwrap()
    }

    #[tokio::test]
    async fn test_live_payload_and_metrics() {
        let samples = vec![
            Sample::new(Variant::Baseline, 2200.0, false),
            Sample::new(Variant::Baseline, 2600.0, true),
            Sample::new(Variant::Optimized, 1500.0, true),
            Sample::new(Variant::Optimized, 60000.0, false),
        ];
        let metrics = Metrics::new().unwrap();
        let service = AnalyticsService::new(Arc::new(FixedSource(samples)), AnalyticsConfig::default())
            .with_metrics(metrics.clone());

        let payload = service.build_payload(&query()).await;
        assert_eq!(payload.origin, PayloadOrigin::Live);
        assert_eq!(payload.optimized.histogram.uncovered, 1);
        assert_eq!(payload.optimized.histogram.total, 1);
        // the dropped sample still shows on the percentile curve
        assert_eq!(payload.optimized.distribution.len(), 2);

        let output = metrics.render();
        assert!(output.contains("perfpulse_samples_uncovered_total{variant=\"optimized\"} 1"));
        assert!(output.contains("perfpulse_samples_processed_total{variant=\"baseline\"} 2"));
    }

    #[tokio::test]
    async fn test_project_observed_uses_measured_uplift() {
        let mut samples = Vec::new();
        for i in 0..100 {
            samples.push(Sample::new(Variant::Baseline, 2400.0, i < 2));
            samples.push(Sample::new(Variant::Optimized, 1600.0, i < 3));
        }
        let service = AnalyticsService::new(Arc::new(FixedSource(samples)), AnalyticsConfig::default());
        let payload = service.build_payload(&query()).await;

        let projection = service.project_observed(&payload, 100_000.0, 50.0).unwrap();
        assert!(projection.valid);
        assert!((projection.breakdown.baseline_rate_percent - 2.0).abs() < 1e-9);
        assert_eq!(projection.boost.round_dp(6), Decimal::from(50_000));
    }

    #[test]
    fn test_invalid_projection_is_counted() {
        let metrics = Metrics::new().unwrap();
        let service = AnalyticsService::new(Arc::new(FixedSource(vec![])), AnalyticsConfig::default())
            .with_metrics(metrics.clone());

        let scenario = RevenueScenario {
            monthly_visitors: f64::NAN,
            ..RevenueScenario::default()
        };
        let projection = service.project_revenue(&scenario);
        assert!(!projection.valid);
        assert_eq!(projection.boost, Decimal::ZERO);
        assert!(metrics.render().contains("valid=\"false\""));
    }

    #[tokio::test]
    async fn test_calculator_needs_no_source() {
        let service = AnalyticsService::calculator(AnalyticsConfig::default());

        let projection = service.project_revenue(&RevenueScenario::default());
        assert!(projection.valid);
        assert_eq!(projection.boost, Decimal::from(12_000));

        let payload = service.build_payload(&query()).await;
        assert_eq!(payload.origin, PayloadOrigin::Fallback);
    }
}
