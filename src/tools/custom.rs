use serde_json::json;

use super::{response_records, timestamped_filename, CustomQueryArgs, ToolOutcome, ToolSurface};
use crate::client::QueryExecutor;
use crate::data::{Dataset, SamplingInfo};
use crate::query::prepare_custom_query;

impl<E: QueryExecutor> ToolSurface<E> {
    /// Run caller-supplied BTQL once; records are kept as returned by the backend
    pub async fn execute_custom_btql(&self, args: CustomQueryArgs) -> ToolOutcome {
        let query = prepare_custom_query(&self.project_id, &args.query, args.limit);
        tracing::info!(limit = args.limit, "Executing custom BTQL query");

        let body = match self.executor.execute(&query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Custom BTQL query failed");
                return custom_failure(&query, &e.to_string());
            }
        };

        let records = response_records(&body);
        let record_count = records.len();

        if !args.auto_save_to_file {
            return ToolOutcome::success(json!({
                "query_executed": query,
                "records": records,
                "record_count": record_count,
            }));
        }

        let dataset = Dataset {
            query_executed: query.clone(),
            sample_size: None,
            record_count: Some(record_count),
            total_available: record_count,
            records,
            sampling_info: SamplingInfo {
                requested: args.limit,
                returned: record_count,
                date_range_hours: None,
                model_filter: None,
                pagination_note: None,
                retries: None,
            },
        };

        let filename = args
            .filename
            .clone()
            .unwrap_or_else(|| timestamped_filename("query", None));

        match self.store.save(&dataset, &filename) {
            Ok(saved) => {
                tracing::info!(
                    records = record_count,
                    path = %saved.path.display(),
                    "Saved custom query results"
                );
                ToolOutcome::success(json!({
                    "status": "success",
                    "query_executed": query,
                    "file_path": saved.path.display().to_string(),
                    "filename": saved.filename,
                    "record_count": record_count,
                    "file_size_bytes": saved.size_bytes,
                    "message": format!(
                        "Saved {} records to {}. Use read_logs_from_file('{}') to analyze.",
                        record_count, saved.filename, saved.filename
                    ),
                }))
            }
            Err(e) => {
                tracing::warn!(error = %e, filename = %filename, "Failed to save custom query results");
                custom_failure(&query, &e.to_string())
            }
        }
    }
}

fn custom_failure(query: &str, error: &str) -> ToolOutcome {
    ToolOutcome::failure(json!({
        "error": error,
        "query_executed": query,
        "records": [],
        "record_count": 0,
    }))
}
