use super::session_record::{SessionRecord, select_samples};
use crate::domain::analytics::{Sample, SampleQuery};
use crate::domain::errors::SampleSourceError;
use crate::domain::ports::SampleSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads session exports with a header row:
/// `session_id,tenant,variant,lcp_ms,fcp_ms,ttfb_ms,converted,timestamp`.
///
/// The file is re-read on every fetch so fresh exports are picked up.
pub struct CsvSampleSource {
    path: PathBuf,
}

impl CsvSampleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(path: &Path) -> Result<Vec<SessionRecord>, SampleSourceError> {
        let file = File::open(path).map_err(|e| SampleSourceError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut rdr = csv::Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: SessionRecord = result.map_err(|e| SampleSourceError::MalformedRecord {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl SampleSource for CsvSampleSource {
    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        let path = self.path.clone();
        let records = tokio::task::spawn_blocking(move || Self::read_records(&path))
            .await
            .context("CSV reader task panicked")??;

        let samples = select_samples(&records, query);
        debug!(
            "CsvSampleSource: {} of {} rows matched tenant {}",
            samples.len(),
            records.len(),
            query.tenant
        );
        Ok(samples)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
