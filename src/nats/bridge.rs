use super::NatsConfig;
use crate::event::{Event, Filter};
use crate::relay::TotemRelay;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Relay hook points reachable over NATS, one subject each
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    Store,
    Delete,
    Query,
    Count,
    Reject,
}

impl Hook {
    pub const ALL: [Hook; 5] = [Hook::Store, Hook::Delete, Hook::Query, Hook::Count, Hook::Reject];

    /// Subject suffix for outbound coordinator events
    pub const PUBLISH_SUFFIX: &'static str = "publish";

    pub fn suffix(&self) -> &'static str {
        match self {
            Hook::Store => "store",
            Hook::Delete => "delete",
            Hook::Query => "query",
            Hook::Count => "count",
            Hook::Reject => "reject",
        }
    }

    /// Hook addressed by `subject`, if it lives under `prefix`
    pub fn from_subject(prefix: &str, subject: &str) -> Option<Hook> {
        let suffix = subject.strip_prefix(prefix)?.strip_prefix('.')?;
        Hook::ALL.into_iter().find(|hook| hook.suffix() == suffix)
    }
}

/// Serve the relay hooks over NATS until the subscriptions close.
///
/// Every message is handled on its own task; store and delete are
/// fire-and-forget, the rest are request/reply.
pub async fn run_bridge(
    relay: Arc<TotemRelay>,
    client: async_nats::Client,
    config: NatsConfig,
) -> Result<()> {
    let mut subscribers = Vec::with_capacity(Hook::ALL.len());
    for hook in Hook::ALL {
        let subject = config.subject(hook.suffix());
        let subscriber = client
            .subscribe(subject.clone())
            .await
            .with_context(|| format!("Failed to subscribe to '{}'", subject))?;
        subscribers.push(subscriber);
    }

    info!(prefix = %config.subject_prefix, "Relay bridge listening");

    let mut inbound = futures::stream::select_all(subscribers);
    while let Some(msg) = inbound.next().await {
        let Some(hook) = Hook::from_subject(&config.subject_prefix, msg.subject.as_str()) else {
            warn!(subject = %msg.subject, "Message on unexpected subject");
            continue;
        };

        let relay = Arc::clone(&relay);
        let client = client.clone();
        tokio::spawn(async move {
            let reply = dispatch(&relay, hook, &msg.payload).await;
            if let Some(reply_to) = msg.reply {
                let body = reply.to_string();
                if let Err(e) = client.publish(reply_to, body.into()).await {
                    error!(hook = hook.suffix(), error = %e, "Failed to send reply");
                }
            }
        });
    }

    warn!("Relay bridge subscriptions ended");
    Ok(())
}

/// Run one hook against a raw JSON payload and build the reply body.
pub async fn dispatch(relay: &TotemRelay, hook: Hook, payload: &[u8]) -> Value {
    match run_hook(relay, hook, payload).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(hook = hook.suffix(), error = %format!("{:#}", e), "Relay hook failed");
            json!({ "error": format!("{:#}", e) })
        }
    }
}

async fn run_hook(relay: &TotemRelay, hook: Hook, payload: &[u8]) -> Result<Value> {
    match hook {
        Hook::Store => {
            let event: Event = decode(payload)?;
            debug!(event_id = %event.id, "Store via bridge");
            relay.handle_store(event).await?;
            Ok(json!({ "ok": true }))
        }
        Hook::Delete => {
            let event: Event = decode(payload)?;
            relay.handle_delete(event).await?;
            Ok(json!({ "ok": true }))
        }
        Hook::Query => {
            let filter: Filter = decode(payload)?;
            let events: Vec<Event> = relay.handle_query(filter).await?.collect().await;
            Ok(serde_json::to_value(events)?)
        }
        Hook::Count => {
            let filter: Filter = decode(payload)?;
            let count = relay.handle_count(filter).await?;
            Ok(json!({ "count": count }))
        }
        Hook::Reject => {
            let event: Event = decode(payload)?;
            let (reject, reason) = relay.handle_reject(&event);
            Ok(json!({ "reject": reject, "reason": reason }))
        }
    }
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).context("Malformed payload")
}
