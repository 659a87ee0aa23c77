use super::TotemError;
use crate::event::Event;
use crate::relay::Publish;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Late-bound publish capability with a per-publish deadline.
///
/// The relay boundary is usually built after the coordinator, so the sink
/// starts empty and is wired up with `Totem::set_publisher`.
pub(super) struct Outbox {
    sink: RwLock<Option<Arc<dyn Publish>>>,
    timeout: Duration,
}

impl Outbox {
    pub(super) fn new(timeout: Duration) -> Self {
        Self {
            sink: RwLock::new(None),
            timeout,
        }
    }

    pub(super) fn set_sink(&self, sink: Arc<dyn Publish>) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    pub(super) fn is_configured(&self) -> bool {
        self.sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Forward one signed event, giving up after the deadline.
    pub(super) async fn publish(&self, event: &Event) -> Result<(), TotemError> {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TotemError::NotConfigured)?;

        match tokio::time::timeout(self.timeout, sink.publish(event)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(TotemError::Transient(format!("{:#}", e))),
            Err(_) => Err(TotemError::Transient(format!(
                "timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Publish on a background task; the caller never waits on the relay.
    pub(super) fn publish_detached(self: &Arc<Self>, event: Event, label: &'static str) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!(
                    event_id = %event.id,
                    label,
                    "No async runtime, skipping background publish"
                );
                return;
            }
        };

        let outbox = Arc::clone(self);
        handle.spawn(async move {
            match outbox.publish(&event).await {
                Ok(()) => debug!(event_id = %event.id, label, "Published"),
                Err(e) => {
                    warn!(event_id = %event.id, label, error = %e, "Background publish failed")
                }
            }
        });
    }
}
