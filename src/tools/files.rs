use serde_json::{json, Value};

use super::{timestamped_filename, ReadLogsArgs, SaveLogsArgs, ToolOutcome, ToolSurface};
use crate::client::QueryExecutor;

impl<E: QueryExecutor> ToolSurface<E> {
    /// Read a slice of a saved dataset
    pub fn read_logs_from_file(&self, args: ReadLogsArgs) -> ToolOutcome {
        match self.store.read_batch(&args.filename, args.start_index, args.count) {
            Ok(batch) => {
                tracing::debug!(
                    filename = %args.filename,
                    start = batch.start_index,
                    returned = batch.count_returned(),
                    total = batch.total_records,
                    "Read dataset batch"
                );
                ToolOutcome::success(json!({
                    "batch_info": {
                        "start_index": args.start_index,
                        "end_index": batch.end_index,
                        "count_returned": batch.count_returned(),
                        "total_records": batch.total_records,
                        "filename": args.filename,
                    },
                    "has_more": batch.has_more,
                    "next_start_index": batch.next_start_index,
                    "records": batch.records,
                }))
            }
            Err(e) => {
                tracing::warn!(filename = %args.filename, error = %e, "Failed to read dataset");
                ToolOutcome::failure(json!({
                    "error": e.to_string(),
                    "records": [],
                    "batch_info": {},
                }))
            }
        }
    }

    /// Persist an arbitrary result document, typically an inline `fetch_logs` response
    pub fn save_logs_to_file(&self, args: SaveLogsArgs) -> ToolOutcome {
        let filename = args.filename.clone().unwrap_or_else(|| {
            let tag = args
                .logs_data
                .pointer("/sampling_info/model_filter")
                .and_then(Value::as_str)
                .unwrap_or("all");
            timestamped_filename("logs", Some(tag))
        });

        let record_count = args
            .logs_data
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        match self.store.save(&args.logs_data, &filename) {
            Ok(saved) => ToolOutcome::success(json!({
                "status": "success",
                "file_path": saved.path.display().to_string(),
                "record_count": record_count,
                "file_size_bytes": saved.size_bytes,
                "message": format!("Saved {} logs to {}", record_count, saved.filename),
            })),
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Failed to save logs");
                ToolOutcome::failure(json!({
                    "status": "error",
                    "error": e.to_string(),
                }))
            }
        }
    }
}
