use crate::domain::analytics::{Metric, Sample, SampleQuery, Variant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw session row as exported by the analytical store.
///
/// Timing columns are optional: a browser may report LCP without TTFB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub tenant: String,
    pub variant: Variant,
    pub lcp_ms: Option<f64>,
    pub fcp_ms: Option<f64>,
    pub ttfb_ms: Option<f64>,
    pub converted: bool,
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Lcp => self.lcp_ms,
            Metric::Fcp => self.fcp_ms,
            Metric::Ttfb => self.ttfb_ms,
        }
    }

    pub fn matches(&self, query: &SampleQuery) -> bool {
        self.tenant == query.tenant && query.contains(self.timestamp)
    }

    pub fn to_sample(&self, metric: Metric) -> Sample {
        Sample {
            variant: self.variant,
            metric_value: self.metric(metric),
            converted: self.converted,
            timestamp: self.timestamp,
        }
    }
}

/// Applies the query filter and projects the requested metric.
pub fn select_samples<'a>(
    records: impl IntoIterator<Item = &'a SessionRecord>,
    query: &SampleQuery,
) -> Vec<Sample> {
    records
        .into_iter()
        .filter(|r| r.matches(query))
        .map(|r| r.to_sample(query.metric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(tenant: &str, age_hours: i64) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::new_v4(),
            tenant: tenant.to_string(),
            variant: Variant::Optimized,
            lcp_ms: Some(1800.0),
            fcp_ms: Some(900.0),
            ttfb_ms: None,
            converted: true,
            timestamp: Utc::now() - Duration::hours(age_hours),
        }
    }

    #[test]
    fn test_select_filters_tenant_and_window() {
        let records = vec![
            record("shop.example", 1),
            record("other.example", 1),
            record("shop.example", 24 * 10),
        ];
        let query = SampleQuery::try_last_days("shop.example", 7, Metric::Fcp).unwrap();

        let samples = select_samples(&records, &query);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].metric_value, Some(900.0));
        assert_eq!(samples[0].variant, Variant::Optimized);
    }

    #[test]
    fn test_missing_metric_projects_to_none() {
        let query = SampleQuery::try_last_days("shop.example", 7, Metric::Ttfb).unwrap();
        let samples = select_samples(&[record("shop.example", 2)], &query);
        assert_eq!(samples[0].metric_value, None);
        assert!(!samples[0].is_valid());
    }
}
