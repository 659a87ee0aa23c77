//! Relay boundary.
//!
//! The embedding relay owns transport, validation and persistence. It calls
//! into [`TotemRelay`] at its store/delete/query/count/reject hook points, and
//! the coordinator calls back out through [`Publish`].

use crate::event::{Event, Filter};
use crate::totem::Totem;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

mod memory;
#[cfg(test)]
pub(crate) mod recording;
#[cfg(test)]
mod tests;

pub use memory::MemoryDatabase;

/// Stream of stored events answering a query
pub type EventStream = BoxStream<'static, Event>;

/// Outbound capability: hand a signed event to the relay.
#[async_trait]
pub trait Publish: Send + Sync {
    async fn publish(&self, event: &Event) -> Result<()>;
}

/// Event persistence behind the relay.
#[async_trait]
pub trait Database: Send + Sync {
    async fn save(&self, event: &Event) -> Result<()>;

    /// Remove a stored event (matched by id)
    async fn delete(&self, event: &Event) -> Result<()>;

    async fn query(&self, filter: &Filter) -> Result<EventStream>;

    async fn count(&self, filter: &Filter) -> Result<u64>;
}

/// Relay information document (NIP-11 subset)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayInfo {
    pub name: String,
    pub description: String,
    pub pubkey: String,
    pub software: String,
    pub version: String,
}

impl Default for RelayInfo {
    fn default() -> Self {
        Self {
            name: "Totem Relay".to_string(),
            description: "A relay with a family of virtual pets living inside it".to_string(),
            pubkey: String::new(),
            software: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Hook surface the embedding relay calls.
pub struct TotemRelay {
    info: RelayInfo,
    totem: Arc<Totem>,
    database: Arc<dyn Database>,
}

impl TotemRelay {
    pub fn new(info: RelayInfo, totem: Arc<Totem>, database: Arc<dyn Database>) -> Self {
        Self {
            info,
            totem,
            database,
        }
    }

    pub fn info(&self) -> &RelayInfo {
        &self.info
    }

    pub fn totem(&self) -> &Arc<Totem> {
        &self.totem
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    /// Persist, then let the pets react on their own task.
    pub async fn handle_store(&self, event: Event) -> Result<()> {
        self.database
            .save(&event)
            .await
            .with_context(|| format!("Failed to save event {}", event.id))?;

        let totem = Arc::clone(&self.totem);
        tokio::spawn(async move {
            totem.on_store(&event);
        });
        Ok(())
    }

    pub async fn handle_delete(&self, event: Event) -> Result<()> {
        self.database
            .delete(&event)
            .await
            .with_context(|| format!("Failed to delete event {}", event.id))?;

        let totem = Arc::clone(&self.totem);
        tokio::spawn(async move {
            totem.on_delete(&event);
        });
        Ok(())
    }

    /// Let the pets narrow the filter, then answer from the database.
    pub async fn handle_query(&self, filter: Filter) -> Result<EventStream> {
        let shaped = self.totem.on_query_filter_shape(filter);
        debug!(limit = ?shaped.limit, "Running shaped query");
        self.database.query(&shaped).await.context("Query failed")
    }

    pub async fn handle_count(&self, filter: Filter) -> Result<u64> {
        let shaped = self.totem.on_query_filter_shape(filter);
        self.database.count(&shaped).await.context("Count failed")
    }

    /// `(reject, reason)`; the reason is empty when accepted.
    pub fn handle_reject(&self, event: &Event) -> (bool, String) {
        let verdict = self.totem.on_reject_decision(event);
        (verdict.reject, verdict.reason)
    }
}
