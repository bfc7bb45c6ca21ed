//! In-Memory Sample Source
//!
//! Thread-safe session store using `Arc<RwLock>`. Suitable for tests and for
//! request handlers that already hold the rows in memory.

use super::session_record::{SessionRecord, select_samples};
use crate::domain::analytics::{Sample, SampleQuery};
use crate::domain::ports::SampleSource;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemorySampleSource {
    records: Arc<RwLock<Vec<SessionRecord>>>,
}

impl InMemorySampleSource {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn insert(&self, record: SessionRecord) {
        self.records.write().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemorySampleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleSource for InMemorySampleSource {
    async fn fetch_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        let records = self.records.read().await;
        Ok(select_samples(records.iter(), query))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{Metric, Variant};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(tenant: &str, variant: Variant, lcp: f64) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::new_v4(),
            tenant: tenant.to_string(),
            variant,
            lcp_ms: Some(lcp),
            fcp_ms: None,
            ttfb_ms: None,
            converted: false,
            timestamp: Utc::now() - chrono::Duration::minutes(5),
        }
    }

    #[tokio::test]
    async fn test_fetch_scopes_to_tenant() {
        let source = InMemorySampleSource::new();
        source.insert(record("a.example", Variant::Baseline, 2100.0)).await;
        source.insert(record("a.example", Variant::Optimized, 1400.0)).await;
        source.insert(record("b.example", Variant::Baseline, 3000.0)).await;
        assert_eq!(source.len().await, 3);

        let query = SampleQuery::try_last_days("a.example", 1, Metric::Lcp).unwrap();
        let samples = source.fetch_samples(&query).await.unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.metric_value != Some(3000.0)));
    }

    #[test]
    fn test_fetch_blocking_on_future() {
        let source =
            InMemorySampleSource::with_records(vec![record("a.example", Variant::Baseline, 900.0)]);
        let query = SampleQuery::try_last_days("a.example", 1, Metric::Lcp).unwrap();

        let samples = tokio_test::block_on(source.fetch_samples(&query)).unwrap();
        assert_eq!(samples.len(), 1);
    }
}
