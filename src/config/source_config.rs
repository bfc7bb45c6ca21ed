//! Sample source configuration parsing from environment variables.

use super::{Lookup, parse_or};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where session samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Seeded demo data
    Synthetic,
    /// Session export on disk
    Csv,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthetic" | "demo" => Ok(SourceKind::Synthetic),
            "csv" => Ok(SourceKind::Csv),
            _ => anyhow::bail!("Invalid SAMPLE_SOURCE: {}. Must be 'synthetic' or 'csv'", s),
        }
    }
}

/// Sample source environment configuration
#[derive(Debug, Clone)]
pub struct SourceEnvConfig {
    pub kind: SourceKind,
    pub csv_path: Option<PathBuf>,
    /// Request-scoped budget for one fetch.
    pub timeout_ms: u64,
    pub seed: u64,
    pub synthetic_sessions: usize,
}

impl Default for SourceEnvConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Synthetic,
            csv_path: None,
            timeout_ms: 5000,
            seed: 42,
            synthetic_sessions: 5000,
        }
    }
}

impl SourceEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let kind = match lookup("SAMPLE_SOURCE") {
            Some(raw) => SourceKind::from_str(raw.trim())?,
            None => defaults.kind,
        };
        // a csv source without a path is rejected when the source is built
        let csv_path = lookup("SAMPLE_CSV_PATH").map(PathBuf::from);

        let synthetic_sessions = parse_or(
            lookup,
            "SYNTHETIC_SESSIONS",
            defaults.synthetic_sessions,
        )
        .context("SYNTHETIC_SESSIONS must be a positive integer")?;
        if synthetic_sessions == 0 {
            anyhow::bail!("SYNTHETIC_SESSIONS must be a positive integer, got 0");
        }

        Ok(Self {
            kind,
            csv_path,
            timeout_ms: parse_or(lookup, "SAMPLE_SOURCE_TIMEOUT_MS", defaults.timeout_ms)?,
            seed: parse_or(lookup, "SAMPLE_SOURCE_SEED", defaults.seed)?,
            synthetic_sessions,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
