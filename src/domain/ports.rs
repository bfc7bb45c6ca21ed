use crate::domain::analytics::{Sample, SampleQuery};
use anyhow::Result;
use async_trait::async_trait;

/// Provider of raw session samples (analytical store, REST API, file...).
///
/// Implementations apply the tenant and window filter of the query; retry
/// policy, if any, belongs here and not in the aggregation engine.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>>;

    /// Short name used in logs and metrics.
    fn name(&self) -> &str;
}
