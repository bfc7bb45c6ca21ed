use super::distribution::{DistributionPoint, DistributionSummary, compute_distribution};
use super::histogram::{
    BinLayout, ExpectedRates, HistogramReport, VariantHistogram, compute_histogram,
};
use super::sample::{Sample, Variant};
use serde::{Deserialize, Serialize};

/// Figures shown when a variant has no usable data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackProfile {
    pub baseline_p75: f64,
    pub optimized_p75: f64,
    pub baseline_conversion_rate: f64,
    pub optimized_conversion_rate: f64,
}

impl FallbackProfile {
    pub fn p75(&self, variant: Variant) -> f64 {
        match variant {
            Variant::Baseline => self.baseline_p75,
            Variant::Optimized => self.optimized_p75,
        }
    }

    pub fn conversion_rate(&self, variant: Variant) -> f64 {
        match variant {
            Variant::Baseline => self.baseline_conversion_rate,
            Variant::Optimized => self.optimized_conversion_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadOrigin {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    pub variant: Variant,
    pub distribution: Vec<DistributionPoint>,
    pub summary: DistributionSummary,
    pub histogram: VariantHistogram,
    /// Weighted conversion percent, or the configured default when the variant is empty.
    pub average_conversion_rate: f64,
}

impl VariantPayload {
    fn build(
        variant: Variant,
        distribution: Vec<DistributionPoint>,
        histogram: VariantHistogram,
        fallback: &FallbackProfile,
    ) -> Self {
        let summary = DistributionSummary::from_points(&distribution)
            .unwrap_or_else(|| DistributionSummary::fallback(fallback.p75(variant)));
        let average_conversion_rate = if histogram.total > 0 {
            histogram.average_conversion_rate
        } else {
            fallback.conversion_rate(variant)
        };
        Self {
            variant,
            distribution,
            summary,
            histogram,
            average_conversion_rate,
        }
    }
}

/// Display payload for one analytics request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    pub origin: PayloadOrigin,
    pub fallback_reason: Option<String>,
    pub baseline: VariantPayload,
    pub optimized: VariantPayload,
    pub observed_uplift_percent: Option<f64>,
}

impl AnalyticsPayload {
    /// Runs the distribution and histogram passes over `samples` and merges them.
    pub fn aggregate(
        samples: &[Sample],
        layout: &BinLayout,
        expected: Option<&ExpectedRates>,
        fallback: &FallbackProfile,
    ) -> Self {
        let ((baseline_curve, optimized_curve), histogram) = rayon::join(
            || {
                rayon::join(
                    || compute_distribution(samples, Variant::Baseline),
                    || compute_distribution(samples, Variant::Optimized),
                )
            },
            || compute_histogram(samples, layout, expected),
        );

        let observed_uplift_percent = histogram.observed_uplift_percent();
        let HistogramReport {
            baseline,
            optimized,
        } = histogram;

        Self {
            origin: PayloadOrigin::Live,
            fallback_reason: None,
            baseline: VariantPayload::build(Variant::Baseline, baseline_curve, baseline, fallback),
            optimized: VariantPayload::build(
                Variant::Optimized,
                optimized_curve,
                optimized,
                fallback,
            ),
            observed_uplift_percent,
        }
    }

    /// Payload rendered when no samples could be obtained at all.
    pub fn fallback(
        layout: &BinLayout,
        fallback: &FallbackProfile,
        reason: impl Into<String>,
    ) -> Self {
        let empty = |variant| {
            VariantPayload::build(
                variant,
                Vec::new(),
                VariantHistogram::empty(variant, layout),
                fallback,
            )
        };
        Self {
            origin: PayloadOrigin::Fallback,
            fallback_reason: Some(reason.into()),
            baseline: empty(Variant::Baseline),
            optimized: empty(Variant::Optimized),
            observed_uplift_percent: None,
        }
    }

    pub fn variant(&self, variant: Variant) -> &VariantPayload {
        match variant {
            Variant::Baseline => &self.baseline,
            Variant::Optimized => &self.optimized,
        }
    }

    /// Valid samples that no histogram bin covered, per variant.
    pub fn uncovered(&self) -> [(Variant, usize); 2] {
        [
            (Variant::Baseline, self.baseline.histogram.uncovered),
            (Variant::Optimized, self.optimized.histogram.uncovered),
        ]
    }
}
