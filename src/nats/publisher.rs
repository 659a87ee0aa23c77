use crate::event::Event;
use crate::relay::Publish;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Hands coordinator events to the relay over NATS
#[derive(Clone)]
pub struct NatsPublisher {
    client: async_nats::Client,
    subject: String,
}

impl NatsPublisher {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl Publish for NatsPublisher {
    /// Payload: NIP-01 JSON of the signed event
    async fn publish(&self, event: &Event) -> Result<()> {
        let payload = serde_json::to_vec(event).context("Failed to serialize event to JSON")?;

        debug!(
            event_id = %event.id,
            kind = event.kind,
            subject = %self.subject,
            "Publishing event to NATS"
        );

        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .with_context(|| format!("Failed to publish event to subject '{}'", self.subject))?;

        // Surface connection trouble inside the caller's deadline
        self.client
            .flush()
            .await
            .context("Failed to flush NATS connection")?;

        Ok(())
    }
}
