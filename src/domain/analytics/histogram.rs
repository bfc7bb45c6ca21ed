//! Load-time histogram correlated with conversion outcome.
//!
//! Bins are half-open `[start, end)` except the last one, which also accepts
//! a value equal to the layout maximum. Samples outside every bin are not
//! folded into an overflow bucket: they are dropped from the bin totals and
//! only counted in [`VariantHistogram::uncovered`] so the caller can report
//! them. This mirrors the dashboard this engine replaces and may hide data
//! loss when the layout does not cover the observed range.

use super::sample::{Sample, Variant, valid_values};
use crate::domain::errors::HistogramConfigError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinRange {
    pub start: f64,
    pub end: f64,
}

impl BinRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Ordered, contiguous, non-overlapping bin ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinLayout {
    ranges: Vec<BinRange>,
}

impl Default for BinLayout {
    /// Load-time bins in milliseconds, up to ten seconds.
    fn default() -> Self {
        let ranges = Self::DEFAULT_EDGES
            .windows(2)
            .map(|w| BinRange::new(w[0], w[1]))
            .collect();
        Self { ranges }
    }
}

impl BinLayout {
    pub const DEFAULT_EDGES: [f64; 8] = [
        0.0, 1000.0, 2000.0, 2500.0, 3000.0, 4000.0, 5000.0, 10000.0,
    ];

    pub fn from_ranges(ranges: Vec<BinRange>) -> Result<Self, HistogramConfigError> {
        if ranges.is_empty() {
            return Err(HistogramConfigError::Empty);
        }

        for (index, range) in ranges.iter().enumerate() {
            if !range.start.is_finite() || !range.end.is_finite() {
                return Err(HistogramConfigError::NonFinite {
                    index,
                    start: range.start,
                    end: range.end,
                });
            }
            if range.start >= range.end {
                return Err(HistogramConfigError::InvertedRange {
                    index,
                    start: range.start,
                    end: range.end,
                });
            }
            if index > 0 {
                let previous_end = ranges[index - 1].end;
                if range.start != previous_end {
                    return Err(HistogramConfigError::NotContiguous {
                        index,
                        start: range.start,
                        previous_end,
                    });
                }
            }
        }

        Ok(Self { ranges })
    }

    /// `[e0, e1), [e1, e2), ... [en-1, en]`
    pub fn from_edges(edges: &[f64]) -> Result<Self, HistogramConfigError> {
        let ranges = edges
            .windows(2)
            .map(|w| BinRange::new(w[0], w[1]))
            .collect();
        Self::from_ranges(ranges)
    }

    pub fn uniform(start: f64, width: f64, count: usize) -> Result<Self, HistogramConfigError> {
        let edges: Vec<f64> = (0..=count).map(|i| start + width * i as f64).collect();
        Self::from_edges(&edges)
    }

    pub fn ranges(&self) -> &[BinRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.ranges.first().map(|r| r.start).unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.ranges.last().map(|r| r.end).unwrap_or(0.0)
    }

    /// Index of the bin holding `value`, or `None` when no bin covers it.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let last = self.ranges.len().checked_sub(1)?;
        self.ranges.iter().enumerate().find_map(|(i, r)| {
            let in_range = value >= r.start && (value < r.end || (i == last && value == r.end));
            in_range.then_some(i)
        })
    }
}

/// Synthetic conversion percentages per bin index, one table per variant.
///
/// Used for demo data where sessions carry no real conversion outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRates {
    pub baseline: Vec<f64>,
    pub optimized: Vec<f64>,
}

impl ExpectedRates {
    pub fn for_variant(&self, variant: Variant) -> &[f64] {
        match variant {
            Variant::Baseline => &self.baseline,
            Variant::Optimized => &self.optimized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub range_start: f64,
    pub range_end: f64,
    pub total: usize,
    pub converted: usize,
    /// Percent of sessions in the bin that converted.
    pub conversion_rate: f64,
}

impl HistogramBin {
    fn new(range: BinRange, total: usize, converted: usize) -> Self {
        Self {
            range_start: range.start,
            range_end: range.end,
            total,
            converted,
            conversion_rate: rate_percent(converted, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantHistogram {
    pub variant: Variant,
    pub bins: Vec<HistogramBin>,
    pub total: usize,
    pub converted: usize,
    /// Population-weighted conversion percent across all bins.
    pub average_conversion_rate: f64,
    /// Valid samples that fell outside every bin.
    pub uncovered: usize,
}

impl VariantHistogram {
    fn from_bins(variant: Variant, bins: Vec<HistogramBin>, uncovered: usize) -> Self {
        let total = bins.iter().map(|b| b.total).sum();
        let converted = bins.iter().map(|b| b.converted).sum();
        Self {
            variant,
            bins,
            total,
            converted,
            average_conversion_rate: rate_percent(converted, total),
            uncovered,
        }
    }

    /// Histogram with every bin at zero, used when no samples could be fetched.
    pub fn empty(variant: Variant, layout: &BinLayout) -> Self {
        let bins = layout
            .ranges()
            .iter()
            .map(|r| HistogramBin::new(*r, 0, 0))
            .collect();
        Self::from_bins(variant, bins, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramReport {
    pub baseline: VariantHistogram,
    pub optimized: VariantHistogram,
}

impl HistogramReport {
    pub fn variant(&self, variant: Variant) -> &VariantHistogram {
        match variant {
            Variant::Baseline => &self.baseline,
            Variant::Optimized => &self.optimized,
        }
    }

    /// Relative change of the optimized conversion rate over the baseline, in percent.
    pub fn observed_uplift_percent(&self) -> Option<f64> {
        let base = self.baseline.average_conversion_rate;
        if base <= 0.0 || self.baseline.total == 0 || self.optimized.total == 0 {
            return None;
        }
        Some((self.optimized.average_conversion_rate / base - 1.0) * 100.0)
    }
}

/// Bins both variants.
///
/// With `expected` set, each bin's `converted` is derived from the table
/// (`total * rate / 100`, rounded half-up) instead of the sample outcomes.
pub fn compute_histogram(
    samples: &[Sample],
    layout: &BinLayout,
    expected: Option<&ExpectedRates>,
) -> HistogramReport {
    HistogramReport {
        baseline: bin_variant(samples, Variant::Baseline, layout, expected),
        optimized: bin_variant(samples, Variant::Optimized, layout, expected),
    }
}

fn bin_variant(
    samples: &[Sample],
    variant: Variant,
    layout: &BinLayout,
    expected: Option<&ExpectedRates>,
) -> VariantHistogram {
    let mut counts = vec![(0usize, 0usize); layout.len()];
    let mut uncovered = 0;

    for (value, converted) in valid_values(samples, variant) {
        match layout.bin_index(value) {
            Some(i) => {
                counts[i].0 += 1;
                if converted {
                    counts[i].1 += 1;
                }
            }
            None => uncovered += 1,
        }
    }

    let table = expected.map(|e| e.for_variant(variant));
    let bins = layout
        .ranges()
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (range, (total, observed)))| {
            let converted = match table {
                Some(rates) => expected_conversions(total, rates.get(i).copied().unwrap_or(0.0)),
                None => observed,
            };
            HistogramBin::new(*range, total, converted)
        })
        .collect();

    VariantHistogram::from_bins(variant, bins, uncovered)
}

/// `round_half_up(total * rate / 100)`, with the rate clamped to `[0, 100]`.
pub fn expected_conversions(total: usize, expected_rate_percent: f64) -> usize {
    let rate = if expected_rate_percent.is_nan() {
        0.0
    } else {
        expected_rate_percent.clamp(0.0, 100.0)
    };
    let rate = Decimal::from_f64(rate).unwrap_or(Decimal::ZERO);

    (Decimal::from(total) * rate / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_usize()
        .unwrap_or(0)
        .min(total)
}

fn rate_percent(converted: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        converted as f64 / total as f64 * 100.0
    }
}
