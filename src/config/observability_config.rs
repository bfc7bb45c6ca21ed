//! Observability configuration parsing from environment variables.
//!
//! This module handles loading logging and metrics configuration.

use super::Lookup;
use std::env;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    /// Emit logs as JSON lines instead of the pretty format.
    pub json_logs: bool,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            json_logs: false,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            enabled: lookup("OBSERVABILITY_ENABLED")
                .unwrap_or_else(|| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
            json_logs: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(&|_| None);
        assert!(config.enabled);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_unparseable_flag_keeps_default() {
        let lookup = lookup_from(&[("OBSERVABILITY_ENABLED", "maybe"), ("LOG_FORMAT", "JSON")]);
        let config = ObservabilityEnvConfig::from_lookup(&lookup);
        assert!(config.enabled);
        assert!(config.json_logs);
    }
}
