pub mod csv_source;
pub mod in_memory;
pub mod session_record;
pub mod synthetic;

pub use csv_source::CsvSampleSource;
pub use in_memory::InMemorySampleSource;
pub use session_record::SessionRecord;
pub use synthetic::SyntheticSampleSource;
