pub mod builder;
pub mod custom;
pub mod predicate;

pub use builder::{build_fetch_logs_query, BtqlQuery, FetchLogsQuery, ModelFilter, LOG_FIELDS};
pub use custom::prepare_custom_query;
pub use predicate::{quote_literal, Field, FilterOperator, Literal, Operand, Predicate};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid field name: {0:?}")]
    InvalidField(String),

    #[error("Unsupported filter value for {field}: {kind}")]
    UnsupportedFilterValue { field: String, kind: &'static str },
}
