//! JSON dataset files
//!
//! Datasets are written whole and read back in bounded slices of their
//! top-level `records` array.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StoreError;

/// Largest slice returned by a single read
pub const MAX_BATCH_SIZE: usize = 50;

/// Result of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Absolute path of the written file
    pub path: PathBuf,
    /// Normalized file name as addressed by callers
    pub filename: String,
    pub size_bytes: u64,
}

/// A contiguous slice of a dataset's records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    pub records: Vec<Value>,
    pub start_index: usize,
    pub end_index: usize,
    pub total_records: usize,
    pub has_more: bool,
    pub next_start_index: Option<usize>,
}

impl Batch {
    pub fn count_returned(&self) -> usize {
        self.records.len()
    }
}

#[derive(Deserialize)]
struct RecordsOnly {
    records: Vec<Value>,
}

/// Reads and writes dataset files below a base directory
#[derive(Debug, Clone)]
pub struct DatasetStore {
    base_dir: PathBuf,
}

impl DatasetStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Path a filename resolves to. Absolute names are used as-is.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    /// Serialize `document` as pretty JSON and write it in one call
    pub fn save<T: Serialize + ?Sized>(&self, document: &T, filename: &str) -> Result<SavedFile, StoreError> {
        let filename = normalize_filename(filename)?;
        let path = self.resolve(&filename);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(document)?;
        fs::write(&path, &data)?;

        let size_bytes = fs::metadata(&path)?.len();
        let path = fs::canonicalize(&path)?;

        tracing::debug!(path = %path.display(), size_bytes, "Dataset written");

        Ok(SavedFile {
            path,
            filename,
            size_bytes,
        })
    }

    /// Read `records[start..min(start + count, total)]`, with `count` capped at [`MAX_BATCH_SIZE`]
    pub fn read_batch(&self, filename: &str, start: usize, count: usize) -> Result<Batch, StoreError> {
        let path = self.resolve(filename);
        if !path.exists() {
            return Err(StoreError::FileNotFound(filename.to_string()));
        }

        let data = fs::read(&path)?;
        let dataset: RecordsOnly = serde_json::from_slice(&data)
            .map_err(|e| StoreError::MalformedDataset(format!("{}: {}", filename, e)))?;

        Ok(slice_records(dataset.records, start, count))
    }
}

fn slice_records(mut records: Vec<Value>, start: usize, count: usize) -> Batch {
    let total_records = records.len();
    let count = count.min(MAX_BATCH_SIZE);
    let from = start.min(total_records);
    let end_index = from.saturating_add(count).min(total_records);

    let batch: Vec<Value> = records.drain(from..end_index).collect();
    let has_more = end_index < total_records;

    Batch {
        records: batch,
        start_index: start,
        end_index,
        total_records,
        has_more,
        next_start_index: has_more.then_some(end_index),
    }
}

/// Ensure the name ends in `.json`
pub fn normalize_filename(filename: &str) -> Result<String, StoreError> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidFilename(filename.to_string()));
    }

    if trimmed.ends_with(".json") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}.json", trimmed))
    }
}
