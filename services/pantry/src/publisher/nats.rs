//! NATS transport for data-change messages.
use super::{PublishError, Publisher, encode_message};
use crate::api::codec::Encoding;
use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use pantry_common::events::DataChangeMessage;
use std::time::Duration;

const PING_INTERVAL: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes each message once to the configured subject.
#[derive(Clone)]
pub struct NatsPublisher {
    client: Client,
    subject: String,
    encoding: Encoding,
}

impl NatsPublisher {
    pub async fn connect(url: &str, subject: &str, encoding: Encoding) -> anyhow::Result<Self> {
        tracing::info!(%subject, "connecting data change publisher to nats");
        // Fail fast when NATS is down at startup; the client reconnects on its own afterwards.
        let client = ConnectOptions::new()
            .name("pantry-data-changes")
            .ping_interval(PING_INTERVAL)
            .connection_timeout(CONNECT_TIMEOUT)
            .connect(url)
            .await?;
        Ok(Self {
            client,
            subject: subject.to_string(),
            encoding,
        })
    }
}

#[async_trait]
impl Publisher for NatsPublisher {
    async fn publish(&self, message: &DataChangeMessage) -> Result<(), PublishError> {
        let payload = encode_message(self.encoding, message)?;
        self.client
            .publish(self.subject.clone(), payload)
            .await
            .map_err(|err| PublishError::Transport(err.to_string()))
    }
}
