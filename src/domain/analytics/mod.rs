// Experiment analytics domain
pub mod distribution;
pub mod histogram;
pub mod payload;
pub mod revenue;
pub mod sample;

pub use distribution::{DistributionPoint, DistributionSummary, compute_distribution};
pub use histogram::{
    BinLayout, BinRange, ExpectedRates, HistogramBin, HistogramReport, VariantHistogram,
    compute_histogram,
};
pub use payload::{AnalyticsPayload, FallbackProfile, PayloadOrigin, VariantPayload};
pub use revenue::{ProjectionMode, RevenueBreakdown, RevenueProjection, RevenueScenario, project};
pub use sample::{Metric, Sample, SampleQuery, Variant};
