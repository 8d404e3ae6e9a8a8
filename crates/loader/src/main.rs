//! Load executor entry point: subscribes to the trigger topic and handles
//! each delivery as it arrives.

use std::process;
use std::sync::Arc;

use futures_util::StreamExt;
use livesink_core::{
    load_dotenv, ConfigLoader, FsObjectStore, HttpWarehouseClient, RedisTopicPublisher,
};
use livesink_loader::config::LoaderConfig;
use livesink_loader::executor::LoadExecutor;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!("loader service failed: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    load_dotenv();
    let config = LoaderConfig::from_env()?;
    config.validate()?;

    let store = Arc::new(FsObjectStore::new(
        config.storage_root.clone(),
        config.source_bucket.clone(),
    ));
    let warehouse = Arc::new(HttpWarehouseClient::new(
        config.warehouse_api_url.clone(),
        config.workgroup.clone(),
        config.database.clone(),
    ));
    let publisher = Arc::new(RedisTopicPublisher::new(
        &config.redis_url,
        config.outcome_topic.clone(),
    )?);

    let client = redis::Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(&config.trigger_topic).await?;
    tracing::info!(topic = %config.trigger_topic, "subscribed to trigger topic");

    let executor = LoadExecutor::new(config, store, warehouse, publisher);

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode trigger payload");
                continue;
            }
        };
        let outcome = executor.handle(&payload).await;
        tracing::info!(status = outcome.status_code, "trigger handled");
    }

    Ok(())
}
