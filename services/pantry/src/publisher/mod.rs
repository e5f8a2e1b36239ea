//! Data-change publishing.
//!
//! A [`Publisher`] takes a [`DataChangeMessage`] and makes a single attempt
//! to hand it to the event bus. Callers treat the result as advisory: a
//! failed publish is logged and counted, never surfaced to the client.
//! Retries and batching, if any, belong to the transport.
use crate::api::codec::{CodecError, Encoding};
use crate::config::{EventsConfig, PublisherBackend};
use anyhow::Context;
use async_trait::async_trait;
use pantry_common::events::DataChangeMessage;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod nats;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("encode data change message: {0}")]
    Encode(#[from] CodecError),
    #[error("transport: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &DataChangeMessage) -> Result<(), PublishError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(&self, message: &DataChangeMessage) -> Result<(), PublishError> {
        tracing::trace!(event_type = %message.event_type, "discarding data change message");
        Ok(())
    }
}

/// Encodes a message the way every transport does: in the configured
/// structured text encoding.
pub fn encode_message(
    encoding: Encoding,
    message: &DataChangeMessage,
) -> Result<bytes::Bytes, PublishError> {
    Ok(encoding.encode(message)?)
}

pub async fn from_config(config: &EventsConfig) -> anyhow::Result<Arc<dyn Publisher>> {
    let publisher: Arc<dyn Publisher> = match config.publisher {
        PublisherBackend::Noop => Arc::new(NoopPublisher),
        PublisherBackend::Memory => Arc::new(memory::MemoryPublisher::new()),
        PublisherBackend::Nats => {
            let url = config
                .nats_url
                .as_deref()
                .context("nats publisher requires a nats url")?;
            Arc::new(
                nats::NatsPublisher::connect(
                    url,
                    &config.data_changes_topic_name,
                    config.encoding,
                )
                .await?,
            )
        }
    };
    Ok(publisher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_common::{ChangeOp, EventType, ResourceKind};

    fn message() -> DataChangeMessage {
        DataChangeMessage {
            event_type: EventType::new(ResourceKind::Recipe, ChangeOp::Created),
            user_id: "u1".to_string(),
            household_id: Some("h1".to_string()),
            scope: Default::default(),
            data: Some(serde_json::json!({"id": "r1"})),
        }
    }

    #[tokio::test]
    async fn noop_publisher_accepts_everything() {
        assert!(NoopPublisher.publish(&message()).await.is_ok());
    }

    #[test]
    fn messages_encode_in_the_configured_encoding() {
        let json = encode_message(Encoding::Json, &message()).expect("json");
        let decoded: serde_json::Value = serde_json::from_slice(&json).expect("decode");
        assert_eq!(decoded["eventType"], "recipe.created");
        assert_eq!(decoded["householdId"], "h1");

        let yaml = encode_message(Encoding::Yaml, &message()).expect("yaml");
        let text = String::from_utf8(yaml.to_vec()).expect("utf8");
        assert!(text.contains("eventType: recipe.created"));
    }
}
