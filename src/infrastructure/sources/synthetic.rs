//! Seeded demo data for dashboards without a connected analytical store.
//!
//! The optimized arm loads faster and conversion probability decays with load
//! time, so the generated payload shows the expected correlation. About one
//! session in a hundred reports a zero reading to exercise invalid-sample handling.

use super::session_record::{SessionRecord, select_samples};
use crate::domain::analytics::{Sample, SampleQuery, Variant};
use crate::domain::ports::SampleSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct ArmProfile {
    lcp_median_ms: f64,
    fcp_ratio: f64,
    ttfb_ratio: f64,
}

impl ArmProfile {
    fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Baseline => Self {
                lcp_median_ms: 2600.0,
                fcp_ratio: 0.55,
                ttfb_ratio: 0.18,
            },
            Variant::Optimized => Self {
                lcp_median_ms: 1700.0,
                fcp_ratio: 0.5,
                ttfb_ratio: 0.12,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyntheticSampleSource {
    seed: u64,
    sessions: usize,
}

impl SyntheticSampleSource {
    pub fn new(seed: u64, sessions: usize) -> Self {
        Self { seed, sessions }
    }

    /// Generates the session rows for a query; identical inputs give identical rows.
    pub fn generate(&self, query: &SampleQuery) -> Vec<SessionRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let window_ms = (query.end - query.start).num_milliseconds().max(1);

        (0..self.sessions)
            .map(|_| {
                let variant = if rng.random_bool(0.5) {
                    Variant::Baseline
                } else {
                    Variant::Optimized
                };
                let profile = ArmProfile::for_variant(variant);

                let lcp = if rng.random_bool(0.01) {
                    0.0
                } else {
                    profile.lcp_median_ms * (0.45 * approx_normal(&mut rng)).exp()
                };
                let conversion_probability = (0.05 * (-lcp / 3000.0).exp()).clamp(0.0, 1.0);
                let offset = rng.random_range(0..window_ms);

                SessionRecord {
                    session_id: Uuid::from_u128(rng.random()),
                    tenant: query.tenant.clone(),
                    variant,
                    lcp_ms: Some(lcp),
                    fcp_ms: Some(lcp * profile.fcp_ratio),
                    ttfb_ms: Some(lcp * profile.ttfb_ratio),
                    converted: rng.random_bool(conversion_probability),
                    timestamp: query.start + Duration::milliseconds(offset),
                }
            })
            .collect()
    }
}

/// Irwin-Hall approximation of a standard normal draw.
fn approx_normal(rng: &mut StdRng) -> f64 {
    (0..12).map(|_| rng.random::<f64>()).sum::<f64>() - 6.0
}

#[async_trait]
impl SampleSource for SyntheticSampleSource {
    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        let source = *self;
        let query = query.clone();
        tokio::task::spawn_blocking(move || {
            let records = source.generate(&query);
            select_samples(&records, &query)
        })
        .await
        .context("Synthetic generator task panicked")
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{BinLayout, Metric, compute_distribution, compute_histogram};

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let source = SyntheticSampleSource::new(7, 200);
        let query = SampleQuery::try_last_days("demo.example", 7, Metric::Lcp).unwrap();

        let a = source.fetch_samples(&query).await.unwrap();
        let b = source.fetch_samples(&query).await.unwrap();
        assert_eq!(a.len(), 200);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| query.contains(s.timestamp)));
    }

    #[tokio::test]
    async fn test_optimized_arm_loads_faster() {
        let source = SyntheticSampleSource::new(42, 4000);
        let query = SampleQuery::try_last_days("demo.example", 30, Metric::Lcp).unwrap();
        let samples = source.fetch_samples(&query).await.unwrap();

        let median = |variant| {
            let curve = compute_distribution(&samples, variant);
            curve[curve.len() / 2].value
        };
        assert!(median(Variant::Optimized) < median(Variant::Baseline));

        let report = compute_histogram(&samples, &BinLayout::default(), None);
        let valid = samples.iter().filter(|s| s.is_valid()).count();
        assert!(valid < samples.len());
        assert_eq!(
            report.baseline.total + report.optimized.total
                + report.baseline.uncovered
                + report.optimized.uncovered,
            valid
        );
    }
}
