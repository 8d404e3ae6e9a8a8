//! Batch ingestion entry point.

use std::process;
use std::sync::Arc;

use livesink_core::{load_dotenv, ConfigLoader, FsObjectStore, RedisTopicPublisher};
use livesink_ingest::collector::BatchCollector;
use livesink_ingest::config::IngestConfig;
use livesink_ingest::pipeline::IngestPipeline;
use livesink_ingest::youtube::YouTubeClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!("ingestion run failed: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    load_dotenv();
    let config = IngestConfig::from_env()?;
    config.validate()?;

    let source = Arc::new(YouTubeClient::new(config.youtube_api_key.clone()));
    let store = Arc::new(FsObjectStore::new(
        config.storage_root.clone(),
        config.storage_bucket.clone(),
    ));
    let publisher = Arc::new(RedisTopicPublisher::new(
        &config.redis_url,
        config.trigger_topic.clone(),
    )?);

    let collector = BatchCollector::new(source, config.stats_policy);
    let pipeline = IngestPipeline::new(collector, store, publisher, config);

    let report = pipeline.run().await?;
    tracing::info!(
        records = report.records,
        data_uri = %report.data_uri,
        manifest_uri = %report.manifest_uri,
        command_uri = %report.command_uri,
        "ingestion run complete"
    );
    Ok(())
}
