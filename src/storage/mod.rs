//! Local persistence for query results

pub mod files;

pub use files::{normalize_filename, Batch, DatasetStore, SavedFile, MAX_BATCH_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
