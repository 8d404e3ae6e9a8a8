//! End-to-end ingestion run.

use std::sync::Arc;

use bytes::Bytes;

use livesink_core::{ObjectStore, TopicPublisher};

use crate::collector::BatchCollector;
use crate::command::render_copy_command;
use crate::config::IngestConfig;
use crate::manifest::build_manifest;
use crate::parquet::encode_records;
use crate::Result;

/// Subject line of the load-trigger notification.
pub const TRIGGER_SUBJECT: &str = "YouTube Data Ready: Trigger Warehouse Load";

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records: usize,
    pub prefix: String,
    pub data_uri: String,
    pub manifest_uri: String,
    pub command_uri: String,
}

/// Wires collector, columnar writer, manifest builder, command builder and
/// trigger publisher into one sequential run.
pub struct IngestPipeline {
    collector: BatchCollector,
    store: Arc<dyn ObjectStore>,
    publisher: Arc<dyn TopicPublisher>,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(
        collector: BatchCollector,
        store: Arc<dyn ObjectStore>,
        publisher: Arc<dyn TopicPublisher>,
        config: IngestConfig,
    ) -> Self {
        Self {
            collector,
            store,
            publisher,
            config,
        }
    }

    /// Runs one ingestion pass: collect, write the columnar file, derive the
    /// manifest and COPY command, publish the load trigger. Any failure
    /// aborts before the remaining steps run.
    pub async fn run(&self) -> Result<RunReport> {
        let batch = self.collector.collect().await?;
        if batch.records.is_empty() {
            tracing::warn!("search returned no live streams, writing an empty batch");
        }

        let prefix = batch.prefix(&self.config.storage_prefix);
        let data_key = batch.data_key(&self.config.storage_prefix);
        let encoded = encode_records(&batch.records)?;
        let data_len = encoded.len();
        self.store
            .put_object(&data_key, Bytes::from(encoded), "application/octet-stream")
            .await?;
        tracing::info!(
            key = %data_key,
            bytes = data_len,
            records = batch.records.len(),
            "wrote batch data"
        );

        let manifest = build_manifest(self.store.as_ref(), &prefix).await?;
        let manifest_key = batch.manifest_key(&self.config.storage_prefix);
        let manifest_json = serde_json::to_vec(&manifest)?;
        self.store
            .put_object(&manifest_key, Bytes::from(manifest_json), "application/json")
            .await?;
        let manifest_uri = self.store.uri_for(&manifest_key).to_string();
        tracing::info!(uri = %manifest_uri, "wrote manifest");

        let command =
            render_copy_command(&self.config.load_table, &manifest_uri, &self.config.iam_role);
        let command_key = batch.command_key(&self.config.storage_prefix);
        self.store
            .put_object(&command_key, Bytes::from(command), "text/plain")
            .await?;
        let command_uri = self.store.uri_for(&command_key).to_string();
        tracing::info!(uri = %command_uri, "wrote COPY command");

        let payload = serde_json::json!({ "copy_command": command_uri }).to_string();
        self.publisher.publish(TRIGGER_SUBJECT, &payload).await?;
        tracing::info!(topic = %self.publisher.topic(), "published load trigger");

        Ok(RunReport {
            records: batch.records.len(),
            prefix,
            data_uri: self.store.uri_for(&data_key).to_string(),
            manifest_uri,
            command_uri,
        })
    }
}
