//! Notification-triggered load execution.
//!
//! One trigger runs the phases `parse -> fetch -> submit -> notify`. Every
//! fault short-circuits into a failure notification; nothing propagates out
//! of [`LoadExecutor::handle`].

use std::sync::Arc;

use livesink_core::{ObjectStore, StatementExecutor, StorageUri, TopicPublisher};

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::trigger::parse_trigger;

/// Subject of a successful load outcome.
pub const OUTCOME_SUBJECT_SUCCESS: &str = "Warehouse Load Success";
/// Subject of a failed load outcome.
pub const OUTCOME_SUBJECT_FAILURE: &str = "Warehouse Load FAILED";

/// Result of handling one trigger, mirrored to the outcome topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub status_code: u16,
    pub body: String,
}

/// Handles one trigger end to end.
pub struct LoadExecutor {
    config: LoaderConfig,
    store: Arc<dyn ObjectStore>,
    warehouse: Arc<dyn StatementExecutor>,
    publisher: Arc<dyn TopicPublisher>,
}

impl LoadExecutor {
    pub fn new(
        config: LoaderConfig,
        store: Arc<dyn ObjectStore>,
        warehouse: Arc<dyn StatementExecutor>,
        publisher: Arc<dyn TopicPublisher>,
    ) -> Self {
        Self {
            config,
            store,
            warehouse,
            publisher,
        }
    }

    /// Processes one raw trigger payload. Every failure becomes a failure
    /// notification and a 500 outcome.
    pub async fn handle(&self, raw: &str) -> LoadOutcome {
        let uri = match parse_trigger(raw) {
            Ok(uri) => uri,
            Err(e) => return self.notify_failure(None, &e).await,
        };
        tracing::info!(uri = %uri, "trigger parsed");

        let command = match self.fetch_command(&uri).await {
            Ok(command) => command,
            Err(e) => return self.notify_failure(Some(&uri), &e).await,
        };
        tracing::debug!(sql = %command, "fetched COPY command");

        match self.warehouse.execute_statement(&command).await {
            Ok(execution) => self.notify_success(&uri, &execution.id).await,
            Err(e) => {
                let err = LoaderError::Submit(e.to_string());
                self.notify_failure(Some(&uri), &err).await
            }
        }
    }

    async fn fetch_command(&self, uri: &StorageUri) -> Result<String, LoaderError> {
        if uri.bucket != self.config.source_bucket {
            return Err(LoaderError::Fetch(format!(
                "bucket {} does not match configured source bucket {}",
                uri.bucket, self.config.source_bucket
            )));
        }
        let body = self
            .store
            .get_object(&uri.key)
            .await
            .map_err(|e| LoaderError::Fetch(e.to_string()))?;
        let text = String::from_utf8(body.to_vec())
            .map_err(|e| LoaderError::Fetch(format!("command object is not valid UTF-8: {}", e)))?;
        Ok(text.trim().to_string())
    }

    async fn notify_success(&self, uri: &StorageUri, execution_id: &str) -> LoadOutcome {
        let body = format!(
            "COPY command executed successfully.\nExecution ID: {}\nWorkgroup: {}\nSource: {}",
            execution_id, self.config.workgroup, uri
        );
        tracing::info!(execution_id, "load submitted");
        self.publish_outcome(OUTCOME_SUBJECT_SUCCESS, &body).await;
        LoadOutcome {
            status_code: 200,
            body,
        }
    }

    // The failure notification carries the full composed message; the
    // returned outcome body is just the error text.
    async fn notify_failure(&self, uri: Option<&StorageUri>, error: &LoaderError) -> LoadOutcome {
        let source = uri.map_or_else(|| "Unknown".to_string(), ToString::to_string);
        let message = format!(
            "Failed to execute COPY command.\nError: {}\nSource: {}",
            error, source
        );
        tracing::error!(error = %error, source = %source, "load failed");
        self.publish_outcome(OUTCOME_SUBJECT_FAILURE, &message).await;
        LoadOutcome {
            status_code: 500,
            body: error.to_string(),
        }
    }

    // Outcome publishing is best effort; a publish failure never changes
    // the returned outcome.
    async fn publish_outcome(&self, subject: &str, body: &str) {
        if let Err(e) = self.publisher.publish(subject, body).await {
            tracing::warn!(error = %e, "failed to publish load outcome");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use livesink_core::{
        MemoryObjectStore, MemoryTopicPublisher, MockStatementExecutor, NotificationEnvelope,
    };

    const COMMAND_KEY: &str = "live_data/batch_t/copy_command.txt";
    const COMMAND_TEXT: &str = "COPY live_streams\nFROM 's3://load-bucket/live_data/batch_t/manifest.json'\nIAM_ROLE 'arn'\nFORMAT AS PARQUET\nMANIFEST;";

    fn test_config() -> LoaderConfig {
        LoaderConfig {
            workgroup: "analytics-wg".to_string(),
            database: "analytics".to_string(),
            source_bucket: "load-bucket".to_string(),
            outcome_topic: "livesink.load.outcome".to_string(),
            trigger_topic: "livesink.load.trigger".to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            warehouse_api_url: "http://localhost:8191".to_string(),
            storage_root: "./data".to_string(),
        }
    }

    fn trigger_for(uri: &str) -> String {
        let payload = serde_json::json!({ "copy_command": uri }).to_string();
        serde_json::to_string(&NotificationEnvelope::single(
            "YouTube Data Ready: Trigger Warehouse Load",
            &payload,
        ))
        .unwrap()
    }

    async fn seeded_store(command: &str) -> Arc<MemoryObjectStore> {
        let store = Arc::new(MemoryObjectStore::new("load-bucket"));
        store
            .put_object(COMMAND_KEY, Bytes::from(command.to_string()), "text/plain")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn success_notifies_with_execution_id_and_workgroup() {
        let store = seeded_store(COMMAND_TEXT).await;
        let warehouse = Arc::new(MockStatementExecutor::with_id("exec-7"));
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse.clone(), publisher.clone());

        let outcome = executor
            .handle(&trigger_for("s3://load-bucket/live_data/batch_t/copy_command.txt"))
            .await;

        assert_eq!(outcome.status_code, 200);
        assert!(outcome.body.contains("Execution ID: exec-7"));
        assert!(outcome.body.contains("Workgroup: analytics-wg"));
        assert!(outcome
            .body
            .contains("Source: s3://load-bucket/live_data/batch_t/copy_command.txt"));

        let submitted = warehouse.get_submitted_statements().await;
        assert_eq!(submitted, vec![COMMAND_TEXT.to_string()]);

        let published = publisher.get_published_messages().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, OUTCOME_SUBJECT_SUCCESS);
        assert_eq!(published[0].1, outcome.body);
    }

    #[tokio::test]
    async fn malformed_trigger_reports_unknown_source() {
        let store = Arc::new(MemoryObjectStore::new("load-bucket"));
        let warehouse = Arc::new(MockStatementExecutor::new());
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse.clone(), publisher.clone());

        let outcome = executor.handle("{\"records\": \"nope\"}").await;

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.body.contains("Trigger parse error"));
        assert!(warehouse.get_submitted_statements().await.is_empty());

        let published = publisher.get_published_messages().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, OUTCOME_SUBJECT_FAILURE);
        assert!(published[0].1.contains("Failed to execute COPY command."));
        assert!(published[0].1.contains("Source: Unknown"));
    }

    #[tokio::test]
    async fn missing_command_object_is_a_fetch_failure() {
        let store = Arc::new(MemoryObjectStore::new("load-bucket"));
        let warehouse = Arc::new(MockStatementExecutor::new());
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse, publisher.clone());

        let outcome = executor
            .handle(&trigger_for("s3://load-bucket/live_data/missing/copy_command.txt"))
            .await;

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.body.contains("Command fetch error"));

        let published = publisher.get_published_messages().await;
        assert!(published[0]
            .1
            .contains("Source: s3://load-bucket/live_data/missing/copy_command.txt"));
    }

    #[tokio::test]
    async fn invalid_utf8_command_is_a_fetch_failure() {
        let store = Arc::new(MemoryObjectStore::new("load-bucket"));
        store
            .put_object(
                COMMAND_KEY,
                Bytes::from_static(b"COPY t FROM '\xff\xfe' MANIFEST;"),
                "text/plain",
            )
            .await
            .unwrap();
        let warehouse = Arc::new(MockStatementExecutor::new());
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse.clone(), publisher.clone());

        let outcome = executor
            .handle(&trigger_for("s3://load-bucket/live_data/batch_t/copy_command.txt"))
            .await;

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.body.contains("Command fetch error"));
        assert!(outcome.body.contains("not valid UTF-8"));
        assert!(warehouse.get_submitted_statements().await.is_empty());

        let published = publisher.get_published_messages().await;
        assert_eq!(published[0].0, OUTCOME_SUBJECT_FAILURE);
    }

    #[tokio::test]
    async fn bucket_mismatch_is_a_fetch_failure() {
        let store = seeded_store(COMMAND_TEXT).await;
        let warehouse = Arc::new(MockStatementExecutor::new());
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse.clone(), publisher);

        let outcome = executor
            .handle(&trigger_for("s3://other-bucket/live_data/batch_t/copy_command.txt"))
            .await;

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.body.contains("does not match configured source bucket"));
        assert!(warehouse.get_submitted_statements().await.is_empty());
    }

    #[tokio::test]
    async fn submit_failure_reports_the_error() {
        let store = seeded_store(COMMAND_TEXT).await;
        let warehouse = Arc::new(MockStatementExecutor::with_failure());
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse, publisher.clone());

        let outcome = executor
            .handle(&trigger_for("s3://load-bucket/live_data/batch_t/copy_command.txt"))
            .await;

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.body.contains("Statement submit error"));

        let published = publisher.get_published_messages().await;
        assert_eq!(published[0].0, OUTCOME_SUBJECT_FAILURE);
    }

    #[tokio::test]
    async fn command_text_is_trimmed_before_submission() {
        let padded = format!("\n  {}  \n\n", COMMAND_TEXT);
        let store = seeded_store(&padded).await;
        let warehouse = Arc::new(MockStatementExecutor::new());
        let publisher = Arc::new(MemoryTopicPublisher::new("livesink.load.outcome"));
        let executor = LoadExecutor::new(test_config(), store, warehouse.clone(), publisher);

        let outcome = executor
            .handle(&trigger_for("s3://load-bucket/live_data/batch_t/copy_command.txt"))
            .await;

        assert_eq!(outcome.status_code, 200);
        let submitted = warehouse.get_submitted_statements().await;
        assert_eq!(submitted, vec![COMMAND_TEXT.to_string()]);
    }
}
