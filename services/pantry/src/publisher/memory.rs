use super::{PublishError, Publisher};
use async_trait::async_trait;
use pantry_common::events::DataChangeMessage;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps every published message in memory. Used for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPublisher {
    messages: Arc<Mutex<Vec<DataChangeMessage>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<DataChangeMessage> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, message: &DataChangeMessage) -> Result<(), PublishError> {
        self.messages.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_common::{ChangeOp, EventType, ResourceKind};

    #[tokio::test]
    async fn records_messages_in_order() {
        let publisher = MemoryPublisher::new();
        for op in [ChangeOp::Created, ChangeOp::Archived] {
            publisher
                .publish(&DataChangeMessage {
                    event_type: EventType::new(ResourceKind::Webhook, op),
                    user_id: "u1".to_string(),
                    household_id: None,
                    scope: Default::default(),
                    data: None,
                })
                .await
                .expect("publish");
        }
        let seen: Vec<String> = publisher
            .messages()
            .await
            .iter()
            .map(|m| m.event_type.to_string())
            .collect();
        assert_eq!(seen, vec!["webhook.created", "webhook.archived"]);
    }
}
