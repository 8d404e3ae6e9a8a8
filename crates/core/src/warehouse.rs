//! Warehouse statement submission.
//!
//! The warehouse exposes an asynchronous execution API: a statement is
//! submitted, an execution id comes back, and the statement runs on the
//! warehouse's side with no polling from here.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::LivesinkError;

/// Handle returned by the warehouse for an asynchronously executing statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementExecution {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    workgroup: &'a str,
    database: &'a str,
    sql: &'a str,
    with_event: bool,
}

/// Submits statements for asynchronous execution.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_statement(&self, sql: &str) -> Result<StatementExecution, LivesinkError>;
}

/// HTTP client for the warehouse statement API.
pub struct HttpWarehouseClient {
    client: reqwest::Client,
    base_url: String,
    workgroup: String,
    database: String,
}

impl HttpWarehouseClient {
    pub fn new(
        base_url: impl Into<String>,
        workgroup: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            workgroup: workgroup.into(),
            database: database.into(),
        }
    }
}

#[async_trait]
impl StatementExecutor for HttpWarehouseClient {
    async fn execute_statement(&self, sql: &str) -> Result<StatementExecution, LivesinkError> {
        let url = format!("{}/v1/statements", self.base_url);
        let request = StatementRequest {
            workgroup: &self.workgroup,
            database: &self.database,
            sql,
            with_event: true,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(LivesinkError::WarehouseError(format!(
                "statement API returned {}",
                response.status()
            )));
        }

        let execution = response.json::<StatementExecution>().await?;
        tracing::debug!(execution_id = %execution.id, "statement submitted");
        Ok(execution)
    }
}

/// Test executor that records submitted SQL and returns a fixed id.
pub struct MockStatementExecutor {
    submitted: Arc<Mutex<Vec<String>>>,
    next_id: String,
    fail: bool,
}

impl MockStatementExecutor {
    pub fn new() -> Self {
        Self {
            submitted: Arc::new(Mutex::new(Vec::new())),
            next_id: "mock-execution-id".to_string(),
            fail: false,
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            next_id: id.into(),
            ..Self::new()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub async fn get_submitted_statements(&self) -> Vec<String> {
        self.submitted.lock().await.clone()
    }
}

impl Default for MockStatementExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatementExecutor for MockStatementExecutor {
    async fn execute_statement(&self, sql: &str) -> Result<StatementExecution, LivesinkError> {
        if self.fail {
            return Err(LivesinkError::WarehouseError(
                "mock statement executor failure".to_string(),
            ));
        }
        self.submitted.lock().await.push(sql.to_string());
        Ok(StatementExecution {
            id: self.next_id.clone(),
        })
    }
}
