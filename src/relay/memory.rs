use super::{Database, EventStream};
use crate::event::{Event, Filter};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Volatile event store keyed by event id.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    events: DashMap<String, Event>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Matching events, newest first, truncated to the filter limit
    fn select(&self, filter: &Filter) -> Vec<Event> {
        let mut matched: Vec<Event> = self
            .events
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        if let Some(limit) = filter.limit {
            matched.truncate(limit as usize);
        }
        matched
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn save(&self, event: &Event) -> Result<()> {
        self.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn delete(&self, event: &Event) -> Result<()> {
        self.events.remove(&event.id);
        Ok(())
    }

    async fn query(&self, filter: &Filter) -> Result<EventStream> {
        Ok(Box::pin(tokio_stream::iter(self.select(filter))))
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        Ok(self.select(filter).len() as u64)
    }
}
