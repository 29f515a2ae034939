//! Job publishing.
//!
//! Retry jobs are fire-and-forget: once the engine accepts the message the
//! request is acknowledged, and the worker reports nothing back here.

use std::sync::Arc;

use async_trait::async_trait;
use emergent_client::{EmergentMessage, EmergentSource};
use serde_json::Value;
use thiserror::Error;

/// The engine refused or failed to accept a message.
#[derive(Debug, Error)]
#[error("failed to publish {topic:?}: {reason}")]
pub struct PublishError {
    pub topic: String,
    pub reason: String,
}

/// Destination for retry jobs.
#[async_trait]
pub trait JobPublisher: Send + Sync {
    /// Publishes `payload` as a message of type `topic`.
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), PublishError>;
}

/// Publishes jobs through the Emergent engine.
#[derive(Clone)]
pub struct EmergentPublisher {
    source: Arc<EmergentSource>,
}

impl EmergentPublisher {
    pub fn new(source: Arc<EmergentSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl JobPublisher for EmergentPublisher {
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), PublishError> {
        let message = EmergentMessage::new(topic).with_payload(payload);
        self.source
            .publish(message)
            .await
            .map_err(|e| PublishError {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}
