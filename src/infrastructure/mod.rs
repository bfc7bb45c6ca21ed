pub mod factory;
pub mod observability;
pub mod sources;

pub use factory::SourceFactory;
pub use sources::{CsvSampleSource, InMemorySampleSource, SessionRecord, SyntheticSampleSource};
