use super::Publish;
use crate::event::Event;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Publish double that remembers what it was given.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    events: Mutex<Vec<Event>>,
    fail_for: Option<String>,
    delay: Option<Duration>,
}

impl RecordingPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Refuses every event signed by `pubkey`, records the rest
    pub(crate) fn failing_for(pubkey: &str) -> Self {
        Self {
            fail_for: Some(pubkey.to_string()),
            ..Self::default()
        }
    }

    /// Accepts only after sleeping for `delay`
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until at least `count` events arrived or a second has passed
    pub(crate) async fn wait_for(&self, count: usize) -> Vec<Event> {
        for _ in 0..100 {
            let events = self.events();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl Publish for RecordingPublisher {
    async fn publish(&self, event: &Event) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_for.as_deref() == Some(event.pubkey.as_str()) {
            bail!("relay refused event {}", event.id);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
