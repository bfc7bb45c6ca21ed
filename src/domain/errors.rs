use thiserror::Error;

/// Errors raised while building a histogram bin layout
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistogramConfigError {
    #[error("Bin layout needs at least one range")]
    Empty,

    #[error("Bin {index} has a non-finite bound: [{start}, {end})")]
    NonFinite { index: usize, start: f64, end: f64 },

    #[error("Bin {index} is empty or inverted: [{start}, {end})")]
    InvertedRange { index: usize, start: f64, end: f64 },

    #[error("Bin {index} starts at {start} but the previous bin ends at {previous_end}")]
    NotContiguous {
        index: usize,
        start: f64,
        previous_end: f64,
    },
}

/// Reasons a revenue scenario cannot be projected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidScenario {
    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("Uplift of {uplift_percent:.2}% leaves no baseline conversion rate")]
    UpliftOutOfRange { uplift_percent: f64 },

    #[error("Projection overflowed the monetary range")]
    Overflow,
}

/// Errors raised by sample source adapters
#[derive(Debug, Error)]
pub enum SampleSourceError {
    #[error("Sample source timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Failed to read samples from {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Malformed sample record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}
