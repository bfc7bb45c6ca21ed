//! Histogram configuration parsing from environment variables.
//!
//! This module handles the bin layout and the optional synthetic
//! conversion-rate tables used for demo data.

use super::{Lookup, parse_f64_list};
use crate::domain::analytics::{BinLayout, ExpectedRates};
use anyhow::{Context, Result};
use std::env;

/// Histogram environment configuration
#[derive(Debug, Clone)]
pub struct HistogramEnvConfig {
    pub layout: BinLayout,
    /// Set only when both variant tables are configured.
    pub expected_rates: Option<ExpectedRates>,
}

impl Default for HistogramEnvConfig {
    fn default() -> Self {
        Self {
            layout: BinLayout::default(),
            expected_rates: None,
        }
    }
}

impl HistogramEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let layout = match parse_f64_list(lookup, "HISTOGRAM_BIN_EDGES")? {
            Some(edges) => {
                BinLayout::from_edges(&edges).context("Invalid HISTOGRAM_BIN_EDGES")?
            }
            None => BinLayout::default(),
        };

        let baseline = parse_f64_list(lookup, "HISTOGRAM_EXPECTED_RATES_BASELINE")?;
        let optimized = parse_f64_list(lookup, "HISTOGRAM_EXPECTED_RATES_OPTIMIZED")?;
        let expected_rates = match (baseline, optimized) {
            (Some(baseline), Some(optimized)) => Some(ExpectedRates {
                baseline,
                optimized,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "HISTOGRAM_EXPECTED_RATES_BASELINE and HISTOGRAM_EXPECTED_RATES_OPTIMIZED must be set together"
            ),
        };

        Ok(Self {
            layout,
            expected_rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_default_layout_covers_ten_seconds() {
        let config = HistogramEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config.layout.min(), 0.0);
        assert_eq!(config.layout.max(), 10000.0);
        assert!(config.expected_rates.is_none());
    }

    #[test]
    fn test_custom_edges_and_tables() {
        let lookup = lookup_from(&[
            ("HISTOGRAM_BIN_EDGES", "0,500,1500"),
            ("HISTOGRAM_EXPECTED_RATES_BASELINE", "4.0,2.5"),
            ("HISTOGRAM_EXPECTED_RATES_OPTIMIZED", "4.5,3.0"),
        ]);
        let config = HistogramEnvConfig::from_lookup(&lookup).unwrap();

        assert_eq!(config.layout.len(), 2);
        let rates = config.expected_rates.unwrap();
        assert_eq!(rates.baseline, vec![4.0, 2.5]);
        assert_eq!(rates.optimized, vec![4.5, 3.0]);
    }

    #[test]
    fn test_rejects_unsorted_edges() {
        let lookup = lookup_from(&[("HISTOGRAM_BIN_EDGES", "0,1500,500")]);
        let err = HistogramEnvConfig::from_lookup(&lookup).unwrap_err();
        assert!(format!("{:#}", err).contains("HISTOGRAM_BIN_EDGES"));
    }

    #[test]
    fn test_rejects_half_configured_tables() {
        let lookup = lookup_from(&[("HISTOGRAM_EXPECTED_RATES_BASELINE", "4.0")]);
        assert!(HistogramEnvConfig::from_lookup(&lookup).is_err());
    }
}
