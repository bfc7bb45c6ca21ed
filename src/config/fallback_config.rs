//! Fallback figures shown when a query returns no usable samples.

use super::{Lookup, parse_or};
use crate::domain::analytics::FallbackProfile;
use anyhow::Result;
use std::env;

/// Fallback environment configuration
#[derive(Debug, Clone)]
pub struct FallbackEnvConfig {
    pub baseline_p75_ms: f64,
    pub optimized_p75_ms: f64,
    pub baseline_conversion_pct: f64,
    pub optimized_conversion_pct: f64,
}

impl Default for FallbackEnvConfig {
    fn default() -> Self {
        Self {
            baseline_p75_ms: 2500.0,
            optimized_p75_ms: 1800.0,
            baseline_conversion_pct: 2.0,
            optimized_conversion_pct: 2.24,
        }
    }
}

impl FallbackEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            baseline_p75_ms: parse_or(lookup, "FALLBACK_BASELINE_P75_MS", defaults.baseline_p75_ms)?,
            optimized_p75_ms: parse_or(
                lookup,
                "FALLBACK_OPTIMIZED_P75_MS",
                defaults.optimized_p75_ms,
            )?,
            baseline_conversion_pct: parse_or(
                lookup,
                "FALLBACK_BASELINE_CONVERSION_PCT",
                defaults.baseline_conversion_pct,
            )?,
            optimized_conversion_pct: parse_or(
                lookup,
                "FALLBACK_OPTIMIZED_CONVERSION_PCT",
                defaults.optimized_conversion_pct,
            )?,
        };

        let values = [
            config.baseline_p75_ms,
            config.optimized_p75_ms,
            config.baseline_conversion_pct,
            config.optimized_conversion_pct,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            anyhow::bail!("Fallback values must be finite and non-negative: {:?}", values);
        }
        Ok(config)
    }

    pub fn profile(&self) -> FallbackProfile {
        FallbackProfile {
            baseline_p75: self.baseline_p75_ms,
            optimized_p75: self.optimized_p75_ms,
            baseline_conversion_rate: self.baseline_conversion_pct,
            optimized_conversion_rate: self.optimized_conversion_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_fallback_overrides() {
        let lookup = lookup_from(&[
            ("FALLBACK_OPTIMIZED_P75_MS", "1200"),
            ("FALLBACK_BASELINE_CONVERSION_PCT", "3.1"),
        ]);
        let profile = FallbackEnvConfig::from_lookup(&lookup).unwrap().profile();

        assert_eq!(profile.baseline_p75, 2500.0);
        assert_eq!(profile.optimized_p75, 1200.0);
        assert_eq!(profile.baseline_conversion_rate, 3.1);
        assert_eq!(profile.optimized_conversion_rate, 2.24);
    }

    #[test]
    fn test_fallback_rejects_negative_and_nan() {
        let lookup = lookup_from(&[("FALLBACK_BASELINE_P75_MS", "-1")]);
        assert!(FallbackEnvConfig::from_lookup(&lookup).is_err());

        let lookup = lookup_from(&[("FALLBACK_OPTIMIZED_CONVERSION_PCT", "NaN")]);
        assert!(FallbackEnvConfig::from_lookup(&lookup).is_err());
    }
}
