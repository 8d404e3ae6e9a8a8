//! Topic publishing for the pub/sub handoff between pipeline stages.
//!
//! Messages travel as a JSON envelope holding exactly one record per publish:
//! a subject line, the payload as a JSON-encoded string, and delivery
//! metadata stamped by the publisher. Consumers read `records[0].message`
//! and parse the payload out of it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::LivesinkError;

/// One delivered message on a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub subject: Option<String>,
    /// Payload, itself a JSON document encoded as a string.
    pub message: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Envelope wrapping the records delivered on a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub records: Vec<NotificationRecord>,
}

impl NotificationEnvelope {
    /// Builds a single-record envelope with fresh delivery metadata.
    pub fn single(subject: &str, message: &str) -> Self {
        Self {
            records: vec![NotificationRecord {
                subject: Some(subject.to_string()),
                message: message.to_string(),
                message_id: Some(Uuid::new_v4().to_string()),
                timestamp: Some(Utc::now().to_rfc3339()),
            }],
        }
    }
}

/// Publisher bound to a single topic.
#[async_trait]
pub trait TopicPublisher: Send + Sync {
    /// Topic this publisher is bound to.
    fn topic(&self) -> &str;

    /// Publishes one message, wrapped in the notification envelope.
    async fn publish(&self, subject: &str, message: &str) -> Result<(), LivesinkError>;
}

/// Publishes notification envelopes over Redis pub/sub.
pub struct RedisTopicPublisher {
    client: redis::Client,
    topic: String,
}

impl RedisTopicPublisher {
    pub fn new(redis_url: &str, topic: impl Into<String>) -> Result<Self, LivesinkError> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            LivesinkError::PublishError(format!("Failed to connect to Redis: {}", e))
        })?;
        Ok(Self {
            client,
            topic: topic.into(),
        })
    }
}

#[async_trait]
impl TopicPublisher for RedisTopicPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, subject: &str, message: &str) -> Result<(), LivesinkError> {
        let envelope = NotificationEnvelope::single(subject, message);
        let payload = serde_json::to_string(&envelope)?;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                LivesinkError::PublishError(format!("Failed to open Redis connection: {}", e))
            })?;
        let receivers: i64 = conn.publish(&self.topic, payload).await.map_err(|e| {
            LivesinkError::PublishError(format!("Failed to publish to {}: {}", self.topic, e))
        })?;
        tracing::debug!(topic = %self.topic, receivers, subject, "published notification");
        Ok(())
    }
}

/// Test publisher that records every message instead of sending it.
pub struct MemoryTopicPublisher {
    topic: String,
    published: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryTopicPublisher {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the `(subject, message)` pairs published so far.
    pub async fn get_published_messages(&self) -> Vec<(String, String)> {
        self.published.lock().await.clone()
    }

    pub async fn clear_messages(&self) {
        self.published.lock().await.clear();
    }
}

#[async_trait]
impl TopicPublisher for MemoryTopicPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, subject: &str, message: &str) -> Result<(), LivesinkError> {
        self.published
            .lock()
            .await
            .push((subject.to_string(), message.to_string()));
        Ok(())
    }
}
