//! Configuration module for perfpulse.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Histogram, Sample Source, Fallback and Observability.
//!
//! Every sub-config can also be built from an arbitrary key lookup, which keeps
//! tests away from the process environment.

mod fallback_config;
mod histogram_config;
mod observability_config;
mod source_config;

pub use fallback_config::FallbackEnvConfig;
pub use histogram_config::HistogramEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use source_config::{SourceEnvConfig, SourceKind};

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Key lookup used to read settings (`std::env::var` in production).
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Main analytics configuration, passed explicitly into the service.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsConfig {
    pub histogram: HistogramEnvConfig,
    pub source: SourceEnvConfig,
    pub fallback: FallbackEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl AnalyticsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            histogram: HistogramEnvConfig::from_lookup(lookup)
                .context("Failed to load histogram config")?,
            source: SourceEnvConfig::from_lookup(lookup)
                .context("Failed to load sample source config")?,
            fallback: FallbackEnvConfig::from_lookup(lookup)
                .context("Failed to load fallback config")?,
            observability: ObservabilityEnvConfig::from_lookup(lookup),
        })
    }
}

fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

/// Comma separated numbers; `None` when the key is unset or blank.
fn parse_f64_list(lookup: Lookup<'_>, key: &str) -> Result<Option<Vec<f64>>> {
    let Some(raw) = lookup(key).filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
        .context(format!("Failed to parse {} - expected comma separated numbers", key))
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}
