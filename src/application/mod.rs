// Request orchestration over the sample source port
pub mod analytics_service;

pub use analytics_service::AnalyticsService;
