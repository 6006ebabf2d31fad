pub mod dataset;
pub mod record;

pub use dataset::{Dataset, SamplingInfo};
pub use record::{format_log_records, LogRecord};
