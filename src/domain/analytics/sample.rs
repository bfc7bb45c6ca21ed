use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Experiment arm a session was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Baseline,
    Optimized,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Baseline, Variant::Optimized];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Baseline => "baseline",
            Variant::Optimized => "optimized",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" | "control" => Ok(Variant::Baseline),
            "optimized" | "treatment" => Ok(Variant::Optimized),
            _ => anyhow::bail!(
                "Invalid variant: {}. Must be 'baseline' or 'optimized'",
                s
            ),
        }
    }
}

/// Page-load timing metric carried by a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Largest Contentful Paint
    #[default]
    Lcp,
    /// First Contentful Paint
    Fcp,
    /// Time to First Byte
    Ttfb,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Lcp => "lcp",
            Metric::Fcp => "fcp",
            Metric::Ttfb => "ttfb",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lcp" => Ok(Metric::Lcp),
            "fcp" => Ok(Metric::Fcp),
            "ttfb" => Ok(Metric::Ttfb),
            _ => anyhow::bail!("Invalid metric: {}. Must be 'lcp', 'fcp' or 'ttfb'", s),
        }
    }
}

/// One measured session, as returned by a sample source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub variant: Variant,
    pub metric_value: Option<f64>,
    pub converted: bool,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    pub fn new(variant: Variant, metric_value: f64, converted: bool) -> Self {
        Self {
            variant,
            metric_value: Some(metric_value),
            converted,
            timestamp: Utc::now(),
        }
    }

    /// The metric value if it is a usable measurement.
    ///
    /// Zero, negative and non-finite readings are measurement errors, not
    /// zero-latency page loads.
    pub fn valid_value(&self) -> Option<f64> {
        self.metric_value.filter(|v| v.is_finite() && *v > 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.valid_value().is_some()
    }
}

/// Valid metric values of one variant, in input order.
pub(crate) fn valid_values(
    samples: &[Sample],
    variant: Variant,
) -> impl Iterator<Item = (f64, bool)> + '_ {
    samples
        .iter()
        .filter(move |s| s.variant == variant)
        .filter_map(|s| s.valid_value().map(|v| (v, s.converted)))
}

/// Number of valid samples recorded for `variant`.
pub fn valid_sample_count(samples: &[Sample], variant: Variant) -> usize {
    valid_values(samples, variant).count()
}

/// Filter handed to a sample source: tenant scope, time window and metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleQuery {
    pub tenant: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub metric: Metric,
}

impl SampleQuery {
    /// Query covering the `days` days up to now.
    ///
    /// Fails unless `days` is positive and the window start is representable.
    pub fn try_last_days(
        tenant: impl Into<String>,
        days: i64,
        metric: Metric,
    ) -> anyhow::Result<Self> {
        if days <= 0 {
            anyhow::bail!("Lookback window must be at least one day, got {}", days);
        }
        let end = Utc::now();
        let start = chrono::Duration::try_days(days)
            .and_then(|window| end.checked_sub_signed(window))
            .with_context(|| format!("Lookback window of {} days is out of range", days))?;

        Ok(Self {
            tenant: tenant.into(),
            start,
            end,
            metric,
        })
    }

    /// Half-open `[start, end)` membership.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_metric_values_are_rejected() {
        let mut sample = Sample::new(Variant::Baseline, 1200.0, false);
        assert_eq!(sample.valid_value(), Some(1200.0));

        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            sample.metric_value = Some(bad);
            assert!(!sample.is_valid(), "{} should be invalid", bad);
        }

        sample.metric_value = None;
        assert!(!sample.is_valid());
    }

    #[test]
    fn test_valid_sample_count_per_variant() {
        let samples = vec![
            Sample::new(Variant::Baseline, 100.0, false),
            Sample::new(Variant::Baseline, 0.0, true),
            Sample::new(Variant::Optimized, 90.0, true),
        ];
        assert_eq!(valid_sample_count(&samples, Variant::Baseline), 1);
        assert_eq!(valid_sample_count(&samples, Variant::Optimized), 1);
    }

    #[test]
    fn test_variant_and_metric_parsing() {
        assert_eq!(Variant::from_str("Control").unwrap(), Variant::Baseline);
        assert_eq!(Variant::from_str("optimized").unwrap(), Variant::Optimized);
        assert!(Variant::from_str("c").is_err());
        assert_eq!(Metric::from_str("TTFB").unwrap(), Metric::Ttfb);
        assert!(Metric::from_str("cls").is_err());
    }

    #[test]
    fn test_lookback_window_bounds() {
        let query = SampleQuery::try_last_days("shop.example", 30, Metric::Lcp).unwrap();
        assert_eq!(query.end - query.start, chrono::Duration::days(30));

        let err = SampleQuery::try_last_days("shop.example", 1_000_000_000_000, Metric::Lcp)
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        assert!(SampleQuery::try_last_days("shop.example", 0, Metric::Lcp).is_err());
        assert!(SampleQuery::try_last_days("shop.example", -7, Metric::Lcp).is_err());
        assert!(SampleQuery::try_last_days("shop.example", i64::MIN, Metric::Lcp).is_err());
    }

    #[test]
    fn test_query_window_is_half_open() {
        let query = SampleQuery::try_last_days("shop.example", 7, Metric::Lcp).unwrap();
        assert!(query.contains(query.start));
        assert!(!query.contains(query.end));
    }
}
