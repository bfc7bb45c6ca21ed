use crate::config::{SourceEnvConfig, SourceKind};
use crate::domain::ports::SampleSource;
use crate::infrastructure::sources::{CsvSampleSource, SyntheticSampleSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub struct SourceFactory;

impl SourceFactory {
    pub fn create_source(config: &SourceEnvConfig) -> Result<Arc<dyn SampleSource>> {
        match config.kind {
            SourceKind::Synthetic => {
                info!(
                    "Using synthetic sample source (seed: {}, sessions: {})",
                    config.seed, config.synthetic_sessions
                );
                Ok(Arc::new(SyntheticSampleSource::new(
                    config.seed,
                    config.synthetic_sessions,
                )))
            }
            SourceKind::Csv => {
                let path = config
                    .csv_path
                    .clone()
                    .context("SAMPLE_CSV_PATH is required for the csv source")?;
                info!("Using CSV sample source: {}", path.display());
                Ok(Arc::new(CsvSampleSource::new(path)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_creates_configured_source() {
        let synthetic = SourceFactory::create_source(&SourceEnvConfig::default()).unwrap();
        assert_eq!(synthetic.name(), "synthetic");

        let csv = SourceEnvConfig {
            kind: SourceKind::Csv,
            csv_path: Some(PathBuf::from("sessions.csv")),
            ..SourceEnvConfig::default()
        };
        assert_eq!(SourceFactory::create_source(&csv).unwrap().name(), "csv");

        let missing_path = SourceEnvConfig {
            kind: SourceKind::Csv,
            ..SourceEnvConfig::default()
        };
        assert!(SourceFactory::create_source(&missing_path).is_err());
    }
}
