use super::sample::{Sample, Variant, valid_values};
use serde::{Deserialize, Serialize};

/// One point of an empirical CDF: `percentile`% of sessions loaded in `value` or less.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionPoint {
    pub value: f64,
    pub percentile: f64,
}

/// Builds the percentile curve of one variant.
///
/// Invalid measurements are skipped, values are sorted ascending (stable, so
/// ties keep their input order) and the i-th of n values gets percentile
/// `i / (n - 1) * 100`. A single value sits at percentile 0 and an empty
/// input yields an empty curve.
pub fn compute_distribution(samples: &[Sample], variant: Variant) -> Vec<DistributionPoint> {
    let mut values: Vec<f64> = valid_values(samples, variant).map(|(v, _)| v).collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| DistributionPoint {
            value,
            percentile: if n > 1 {
                i as f64 / (n - 1) as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Metric value at percentile `p` of a curve, interpolating linearly between ranks.
pub fn percentile_value(points: &[DistributionPoint], p: f64) -> Option<f64> {
    let n = points.len();
    if n == 0 || p.is_nan() {
        return None;
    }
    if n == 1 {
        return Some(points[0].value);
    }

    let idx = p.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        Some(points[lo].value)
    } else {
        let w = idx - lo as f64;
        Some(points[lo].value * (1.0 - w) + points[hi].value * w)
    }
}

/// Headline figures for a dashboard card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub count: usize,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub mean: f64,
    /// True when the figures come from configured defaults rather than samples.
    pub is_fallback: bool,
}

impl DistributionSummary {
    pub fn from_points(points: &[DistributionPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mean = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;
        Some(Self {
            count: points.len(),
            p50: percentile_value(points, 50.0)?,
            p75: percentile_value(points, 75.0)?,
            p95: percentile_value(points, 95.0)?,
            mean,
            is_fallback: false,
        })
    }

    /// Summary shown when a variant has no usable samples.
    pub fn fallback(p75: f64) -> Self {
        Self {
            count: 0,
            p50: p75,
            p75,
            p95: p75,
            mean: p75,
            is_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(value: f64) -> Sample {
        Sample::new(Variant::Baseline, value, false)
    }

    #[test]
    fn test_two_samples_span_full_range() {
        let samples = vec![
            Sample::new(Variant::Baseline, 1000.0, false),
            Sample::new(Variant::Baseline, 2000.0, true),
        ];
        let points = compute_distribution(&samples, Variant::Baseline);
        assert_eq!(
            points,
            vec![
                DistributionPoint { value: 1000.0, percentile: 0.0 },
                DistributionPoint { value: 2000.0, percentile: 100.0 },
            ]
        );
    }

    #[test]
    fn test_sorted_and_non_decreasing() {
        let samples: Vec<Sample> = [3200.0, 800.0, 1500.0, 800.0, 2400.0, 120.0]
            .into_iter()
            .map(baseline)
            .collect();
        let points = compute_distribution(&samples, Variant::Baseline);

        assert_eq!(points.len(), 6);
        for pair in points.windows(2) {
            assert!(pair[0].value <= pair[1].value);
            assert!(pair[0].percentile <= pair[1].percentile);
        }
        assert_eq!(points[0].percentile, 0.0);
        assert_eq!(points[5].percentile, 100.0);
        assert!((points[1].percentile - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_filters_variant_and_invalid_values() {
        let mut missing = baseline(1.0);
        missing.metric_value = None;
        let samples = vec![
            baseline(500.0),
            baseline(0.0),
            baseline(-3.0),
            missing,
            Sample::new(Variant::Optimized, 300.0, true),
        ];

        let points = compute_distribution(&samples, Variant::Baseline);
        assert_eq!(points, vec![DistributionPoint { value: 500.0, percentile: 0.0 }]);

        let optimized = compute_distribution(&samples, Variant::Optimized);
        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].value, 300.0);
    }

    #[test]
    fn test_empty_input_gives_empty_curve() {
        assert!(compute_distribution(&[], Variant::Optimized).is_empty());
        assert!(compute_distribution(&[baseline(100.0)], Variant::Optimized).is_empty());
    }

    #[test]
    fn test_percentile_value_interpolates() {
        let samples: Vec<Sample> = [100.0, 200.0, 300.0, 400.0, 500.0]
            .into_iter()
            .map(baseline)
            .collect();
        let points = compute_distribution(&samples, Variant::Baseline);

        assert_eq!(percentile_value(&points, 50.0), Some(300.0));
        assert_eq!(percentile_value(&points, 75.0), Some(400.0));
        let p90 = percentile_value(&points, 90.0).unwrap();
        assert!((p90 - 460.0).abs() < 1e-9);
        assert_eq!(percentile_value(&points, 150.0), Some(500.0));
        assert_eq!(percentile_value(&[], 50.0), None);
    }

    #[test]
    fn test_summary_from_points() {
        let samples: Vec<Sample> = [1000.0, 2000.0, 3000.0].into_iter().map(baseline).collect();
        let points = compute_distribution(&samples, Variant::Baseline);
        let summary = DistributionSummary::from_points(&points).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.p50, 2000.0);
        assert_eq!(summary.p75, 2500.0);
        assert_eq!(summary.mean, 2000.0);
        assert!(!summary.is_fallback);

        assert!(DistributionSummary::from_points(&[]).is_none());
        assert!(DistributionSummary::fallback(2500.0).is_fallback);
    }
}
