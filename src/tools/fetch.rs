use serde_json::{json, Value};

use super::{response_records, timestamped_filename, FetchLogsArgs, FetchPolicy, ToolOutcome, ToolSurface};
use crate::client::{BtqlError, QueryExecutor};
use crate::data::{format_log_records, Dataset, SamplingInfo};
use crate::query::{build_fetch_logs_query, FetchLogsQuery, ModelFilter};

impl<E: QueryExecutor> ToolSurface<E> {
    /// Fetch chat logs, save them to a dataset file and return a summary
    pub async fn fetch_logs(&self, args: FetchLogsArgs) -> ToolOutcome {
        let limit = args.sample_size.min(self.policy.max_sample_size);
        let pagination_note = (args.sample_size > self.policy.max_sample_size).then(|| {
            format!(
                "Requested {} but limited to {}. Pagination not yet implemented.",
                args.sample_size, self.policy.max_sample_size
            )
        });

        let spec = FetchLogsQuery {
            model_filter: ModelFilter::parse(args.model_filter.as_deref()),
            hours_back: args.hours_back,
            exclude_first_hours: args.exclude_first_hours,
            span_name_filter: args.span_name_filter.clone(),
            additional_filters: args.additional_filters.clone().unwrap_or_default(),
            limit,
        };

        let query = match build_fetch_logs_query(&self.project_id, &spec) {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected fetch_logs filters");
                return fetch_failure(&args, String::new(), &e.to_string(), 0);
            }
        };

        tracing::info!(
            model_filter = ?args.model_filter,
            limit,
            hours_back = args.hours_back,
            "Fetching logs"
        );

        let (result, retries) = execute_with_retry(&self.executor, &query, &self.policy).await;
        let body = match result {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, retries, "fetch_logs failed");
                return fetch_failure(&args, query, &e.to_string(), retries);
            }
        };

        let raw = response_records(&body);
        let records = format_log_records(&raw);
        let reported_retries = (retries > 0).then_some(retries);

        let dataset = Dataset {
            query_executed: query.clone(),
            sample_size: Some(args.sample_size),
            record_count: None,
            total_available: raw.len(),
            sampling_info: SamplingInfo {
                requested: args.sample_size,
                returned: records.len(),
                date_range_hours: Some(format!(
                    "{} hours back, excluding first {} hour(s)",
                    args.hours_back, args.exclude_first_hours
                )),
                model_filter: args.model_filter.clone(),
                pagination_note: pagination_note.clone(),
                retries: reported_retries,
            },
            records,
        };

        if !args.auto_save_to_file {
            return match serde_json::to_value(&dataset) {
                Ok(payload) => ToolOutcome::success(payload),
                Err(e) => fetch_failure(&args, query, &e.to_string(), retries),
            };
        }

        let filename = args.filename.clone().unwrap_or_else(|| {
            timestamped_filename("logs", Some(args.model_filter.as_deref().unwrap_or("all")))
        });

        let saved = match self.store.save(&dataset, &filename) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, filename = %filename, "Failed to save fetched logs");
                return fetch_failure(&args, query, &e.to_string(), retries);
            }
        };

        tracing::info!(
            records = dataset.len(),
            path = %saved.path.display(),
            "Saved fetched logs"
        );

        ToolOutcome::success(json!({
            "status": "success",
            "file_path": saved.path.display().to_string(),
            "filename": saved.filename,
            "record_count": dataset.len(),
            "file_size_bytes": saved.size_bytes,
            "sampling_info": {
                "requested": args.sample_size,
                "returned": dataset.len(),
                "model_filter": args.model_filter,
                "pagination_note": pagination_note,
                "retries": reported_retries,
            },
            "message": format!(
                "Saved {} logs to {}. Use read_logs_from_file('{}') to analyze.",
                dataset.len(),
                saved.filename,
                saved.filename
            ),
        }))
    }
}

/// Run a query, retrying transient failures. Returns the result and the number of retries used.
pub(crate) async fn execute_with_retry<E: QueryExecutor + ?Sized>(
    executor: &E,
    query: &str,
    policy: &FetchPolicy,
) -> (Result<Value, BtqlError>, u32) {
    let mut retries = 0;
    loop {
        match executor.execute(query).await {
            Ok(body) => return (Ok(body), retries),
            Err(e) if e.is_transient() && retries + 1 < policy.max_attempts => {
                retries += 1;
                tracing::warn!(
                    attempt = retries,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Transient BTQL failure, retrying"
                );
                tokio::time::sleep(policy.retry_delay).await;
            }
            Err(e) => return (Err(e), retries),
        }
    }
}

fn fetch_failure(args: &FetchLogsArgs, query: String, error: &str, retries: u32) -> ToolOutcome {
    ToolOutcome::failure(json!({
        "error": error,
        "query_executed": query,
        "sample_size": args.sample_size,
        "records": [],
        "sampling_info": {
            "requested": args.sample_size,
            "returned": 0,
            "error": error,
            "retries_attempted": retries,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DatasetStore;
    use crate::tools::testing::{server_error, ScriptedExecutor};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn fast_policy() -> FetchPolicy {
        FetchPolicy {
            retry_delay: Duration::from_millis(5),
            ..FetchPolicy::default()
        }
    }

    fn surface(temp_dir: &TempDir, responses: Vec<Result<Value, BtqlError>>) -> ToolSurface<ScriptedExecutor> {
        ToolSurface::new(
            ScriptedExecutor::new(responses),
            DatasetStore::new(temp_dir.path()),
            "proj-1",
        )
        .with_policy(fast_policy())
    }

    fn logs_body(n: usize) -> Value {
        let data: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "id": format!("log-{}", i),
                    "userID": format!("usr_{}", i),
                    "input": [
                        {"role": "system", "content": "persona"},
                        {"role": "user", "content": "hi"}
                    ],
                    "output": "hey!",
                    "metadata": {"model": "gpt-5-mini"},
                    "created": "2025-09-01T00:00:00Z",
                    "span_attributes": {"name": "chat"}
                })
            })
            .collect();
        json!({ "data": data })
    }

    #[tokio::test]
    async fn test_fetch_saves_and_summarizes() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Ok(logs_body(3))]);

        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                model_filter: Some("mini".into()),
                filename: Some("mini_logs".into()),
                ..Default::default()
            })
            .await;

        assert!(!outcome.is_error);
        let payload = &outcome.payload;
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["filename"], "mini_logs.json");
        assert_eq!(payload["record_count"], 3);
        assert!(payload.get("records").is_none());
        assert_eq!(payload["sampling_info"]["retries"], Value::Null);

        let stored: Value = serde_json::from_slice(
            &std::fs::read(temp_dir.path().join("mini_logs.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(stored["sample_size"], 150);
        assert_eq!(stored["total_available"], 3);
        assert_eq!(stored["sampling_info"]["model_filter"], "mini");
        assert_eq!(
            stored["sampling_info"]["date_range_hours"],
            "48 hours back, excluding first 1 hour(s)"
        );
        assert_eq!(stored["records"][0]["user_id"], "usr_0");
        assert_eq!(stored["records"][0]["input"].as_array().unwrap().len(), 1);
        assert!(stored["query_executed"]
            .as_str()
            .unwrap()
            .contains("metadata.model LIKE '%mini%'"));
    }

    #[tokio::test]
    async fn test_sample_size_capped() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Ok(logs_body(2))]);

        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                sample_size: 500,
                auto_save_to_file: false,
                ..Default::default()
            })
            .await;

        assert!(!outcome.is_error);
        let query = &tools.executor.queries()[0];
        assert!(query.ends_with("\nlimit: 250"));
        assert_eq!(outcome.payload["sample_size"], 500);
        assert_eq!(
            outcome.payload["sampling_info"]["pagination_note"],
            "Requested 500 but limited to 250. Pagination not yet implemented."
        );
    }

    #[tokio::test]
    async fn test_inline_result_when_auto_save_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Ok(logs_body(2))]);

        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                auto_save_to_file: false,
                ..Default::default()
            })
            .await;

        assert_eq!(outcome.payload["records"].as_array().unwrap().len(), 2);
        assert_eq!(outcome.payload["sampling_info"]["pagination_note"], Value::Null);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(
            &temp_dir,
            vec![Err(server_error()), Err(server_error()), Ok(logs_body(1))],
        );

        let started = Instant::now();
        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                filename: Some("retry.json".into()),
                ..Default::default()
            })
            .await;

        assert!(!outcome.is_error);
        assert_eq!(tools.executor.calls(), 3);
        assert_eq!(outcome.payload["sampling_info"]["retries"], 2);
        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_gives_up_after_three_attempts() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(
            &temp_dir,
            vec![
                Err(server_error()),
                Err(server_error()),
                Err(server_error()),
                Ok(logs_body(1)),
            ],
        );

        let outcome = tools.fetch_logs(FetchLogsArgs::default()).await;

        assert!(outcome.is_error);
        assert_eq!(tools.executor.calls(), 3);
        assert_eq!(outcome.payload["sampling_info"]["retries_attempted"], 2);
        assert_eq!(outcome.payload["records"], json!([]));
        assert!(outcome.payload["error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_non_transient_failure_not_retried() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(
            &temp_dir,
            vec![
                Err(BtqlError::QueryFailed {
                    status: 400,
                    preview: "bad query".into(),
                }),
                Ok(logs_body(1)),
            ],
        );

        let outcome = tools.fetch_logs(FetchLogsArgs::default()).await;

        assert!(outcome.is_error);
        assert_eq!(tools.executor.calls(), 1);
        assert_eq!(outcome.payload["sampling_info"]["retries_attempted"], 0);
        assert!(outcome.payload["query_executed"]
            .as_str()
            .unwrap()
            .starts_with("from: project_logs('proj-1')"));
    }

    #[tokio::test]
    async fn test_missing_api_key_not_retried() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Err(BtqlError::MissingApiKey)]);

        let outcome = tools.fetch_logs(FetchLogsArgs::default()).await;

        assert!(outcome.is_error);
        assert_eq!(tools.executor.calls(), 1);
        assert_eq!(
            outcome.payload["error"],
            "BRAINTRUST_API_KEY environment variable not set"
        );
    }

    #[tokio::test]
    async fn test_invalid_filter_never_reaches_backend() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Ok(logs_body(1))]);

        let mut filters = serde_json::Map::new();
        filters.insert("bad field".into(), json!(1));

        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                additional_filters: Some(filters),
                ..Default::default()
            })
            .await;

        assert!(outcome.is_error);
        assert_eq!(tools.executor.calls(), 0);
        assert!(outcome.payload["error"].as_str().unwrap().contains("Invalid field name"));
    }

    #[tokio::test]
    async fn test_content_type_and_network_errors_not_retried() {
        let html = || BtqlError::UnexpectedContentType {
            content_type: "text/html".into(),
            preview: "<h1>500 Internal Server Error</h1>".into(),
        };
        let executor = ScriptedExecutor::new(vec![Err(html()), Err(html()), Err(html())]);
        let (result, retries) = execute_with_retry(&executor, "q", &fast_policy()).await;
        tokio_test::assert_err!(result);
        assert_eq!(executor.calls(), 1);
        assert_eq!(retries, 0);

        let network = || BtqlError::Network("error sending request for url (http://localhost:8500/btql)".into());
        let executor = ScriptedExecutor::new(vec![Err(network()), Err(network()), Err(network())]);
        let (result, retries) = execute_with_retry(&executor, "q", &fast_policy()).await;
        tokio_test::assert_err!(result);
        assert_eq!(executor.calls(), 1);
        assert_eq!(retries, 0);
    }

    #[tokio::test]
    async fn test_save_failure_reports_retries() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Err(server_error()), Ok(logs_body(1))]);

        // A directory already occupies the target name
        std::fs::create_dir(temp_dir.path().join("taken.json")).unwrap();

        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                filename: Some("taken.json".into()),
                ..Default::default()
            })
            .await;

        assert!(outcome.is_error);
        assert_eq!(tools.executor.calls(), 2);
        assert_eq!(outcome.payload["sampling_info"]["retries_attempted"], 1);
        assert!(outcome.payload["query_executed"].as_str().unwrap().starts_with("from:"));
    }

    #[tokio::test]
    async fn test_default_filename_uses_model_tag() {
        let temp_dir = TempDir::new().unwrap();
        let tools = surface(&temp_dir, vec![Ok(logs_body(1))]);

        let outcome = tools
            .fetch_logs(FetchLogsArgs {
                model_filter: Some("NOT mini".into()),
                ..Default::default()
            })
            .await;

        let filename = outcome.payload["filename"].as_str().unwrap();
        assert!(filename.starts_with("logs_NOT_mini_"), "{}", filename);
        assert!(temp_dir.path().join(filename).exists());
    }

    #[tokio::test]
    async fn test_execute_with_retry_counts() {
        let executor = ScriptedExecutor::new(vec![Err(server_error()), Ok(json!({"data": []}))]);
        let (result, retries) = execute_with_retry(&executor, "q", &fast_policy()).await;
        tokio_test::assert_ok!(result);
        assert_eq!(retries, 1);
    }
}
