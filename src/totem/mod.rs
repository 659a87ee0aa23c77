//! Coordinator: owns every pet, routes relay traffic to them and hands their
//! outbound events to the publish capability.
//!
//! Lock order is registry first, then an entity's own state lock. Nothing
//! takes the registry lock while holding an entity lock, and neither lock is
//! ever held across an `.await`.

use crate::event::{Event, Filter, Keys, TAG_PUBKEY};
use crate::pet::{Creature, Egg, Entity, Verdict};
use crate::relay::Publish;
use crate::status::metadata_event;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

mod commands;
mod error;
mod outbox;

pub use commands::CommandReply;
pub use error::TotemError;

use outbox::Outbox;

/// Default deadline for a single outbound publish
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

const EGG_ABOUT: &str = "A mysterious egg waiting to hatch";
const PET_ABOUT: &str = "A virtual pet living on this relay";

/// Registry of pets keyed by hex public key.
///
/// The map is ordered so "first" always means lowest identity key.
pub struct Totem {
    entities: RwLock<BTreeMap<String, Arc<Entity>>>,
    outbox: Arc<Outbox>,
}

impl Default for Totem {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISH_TIMEOUT)
    }
}

impl Totem {
    pub fn new(publish_timeout: Duration) -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            outbox: Arc::new(Outbox::new(publish_timeout)),
        }
    }

    fn read_entities(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<Entity>>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entities(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<Entity>>> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wire up the outbound capability. Replaces any previous one.
    pub fn set_publisher(&self, publisher: Arc<dyn Publish>) {
        self.outbox.set_sink(publisher);
        info!("Publish capability configured");
    }

    pub fn has_publisher(&self) -> bool {
        self.outbox.is_configured()
    }

    /// Publish a signed event through the configured capability.
    pub async fn publish(&self, event: &Event) -> Result<(), TotemError> {
        self.outbox.publish(event).await
    }

    /// Add an entity under its own identity key (last write wins).
    pub fn register(&self, entity: Entity) -> Arc<Entity> {
        let entity = Arc::new(entity);
        let id = entity.id().to_string();
        self.write_entities().insert(id.clone(), Arc::clone(&entity));
        debug!(pet_id = %id, phase = entity.phase(), "Entity registered");
        entity
    }

    pub fn get(&self, id: &str) -> Option<Arc<Entity>> {
        self.read_entities().get(id).cloned()
    }

    /// Snapshot of every entity, ordered by identity key
    pub fn entities(&self) -> Vec<Arc<Entity>> {
        self.read_entities().values().cloned().collect()
    }

    /// Snapshot of hatched pets, ordered by identity key
    pub fn active_pets(&self) -> Vec<Arc<Entity>> {
        self.read_entities()
            .values()
            .filter(|entity| !entity.is_egg())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_entities().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entities().is_empty()
    }

    /// Eggs created by `owner`, ordered by identity key
    pub fn find_eggs_by_owner(&self, owner: &str) -> Vec<Arc<Entity>> {
        self.read_entities()
            .values()
            .filter(|entity| entity.as_egg().is_some_and(|egg| egg.owner() == owner))
            .cloned()
            .collect()
    }

    /// Generate a fresh identity, register an egg for `owner` and announce it.
    pub fn create_egg(&self, owner: &str) -> Arc<Entity> {
        let egg = self.register(Entity::Egg(Egg::new(Keys::generate(), owner, Utc::now())));
        info!(pet_id = %egg.id(), owner = %owner, "Egg created");
        self.announce(&egg, EGG_ABOUT);
        egg
    }

    /// Hatch the egg at `entity_id` into a pet called `name`.
    ///
    /// Check and replacement happen under one registry write lock, so of two
    /// racing callers exactly one succeeds and the other sees `InvalidState`.
    pub fn name_pet(&self, entity_id: &str, name: &str) -> Result<Arc<Entity>, TotemError> {
        let pet = {
            let mut entities = self.write_entities();

            let hatched = {
                let current = entities
                    .get(entity_id)
                    .ok_or_else(|| TotemError::NotFound(entity_id.to_string()))?;
                let egg = current.as_egg().ok_or_else(|| {
                    TotemError::InvalidState(format!("{} has already hatched", entity_id))
                })?;
                if egg.owner().is_empty() {
                    return Err(TotemError::Unauthorized(format!(
                        "egg {} has no owner",
                        entity_id
                    )));
                }
                Arc::new(Entity::Pet(egg.hatch(name, Utc::now())))
            };

            entities.insert(entity_id.to_string(), Arc::clone(&hatched));
            hatched
        };

        info!(pet_id = %entity_id, name = %name, "Egg hatched");
        self.announce(&pet, PET_ABOUT);
        Ok(pet)
    }

    /// Pick the entity an inbound message is meant for.
    ///
    /// In order: a `p` tag naming a known entity, the author's own entity,
    /// any hatched pet, any entity at all.
    pub fn resolve_target(&self, event: &Event) -> Option<Arc<Entity>> {
        let entities = self.read_entities();

        if let Some(entity) = event
            .tag_values(TAG_PUBKEY)
            .find_map(|id| entities.get(id))
        {
            return Some(Arc::clone(entity));
        }

        if !event.pubkey.is_empty() {
            if let Some(entity) = entities
                .values()
                .find(|entity| entity.creature().owner() == event.pubkey)
            {
                return Some(Arc::clone(entity));
            }
        }

        entities
            .values()
            .find(|entity| !entity.is_egg())
            .or_else(|| entities.values().next())
            .cloned()
    }

    /// An inbound message was stored by the relay.
    ///
    /// Recognized commands are consumed and never feed anyone.
    pub fn on_store(&self, event: &Event) {
        if let Some(outcome) = self.execute_command(event) {
            match outcome {
                Ok(reply) => debug!(event_id = %event.id, ?reply, "Command handled"),
                Err(e) => warn!(
                    event_id = %event.id,
                    author = %event.pubkey,
                    error = %e,
                    "Command failed"
                ),
            }
            return;
        }

        match self.resolve_target(event) {
            Some(target) => target.creature().on_fed(event, Utc::now()),
            None => debug!(event_id = %event.id, "No pets to feed"),
        }
    }

    /// A message was deleted at the relay.
    pub fn on_delete(&self, event: &Event) {
        match self.resolve_target(event) {
            Some(target) => target.creature().on_deleted(event),
            None => debug!(event_id = %event.id, "No pets to notify of deletion"),
        }
    }

    /// Thread a query filter through every hatched pet in key order.
    ///
    /// If any pet fails, the caller's filter comes back untouched.
    pub fn on_query_filter_shape(&self, filter: Filter) -> Filter {
        let original = filter.clone();
        let mut shaped = filter;

        for pet in self.active_pets() {
            shaped = match pet.creature().shape_query(shaped) {
                Ok(next) => next,
                Err(e) => {
                    warn!(
                        pet_id = %pet.id(),
                        error = %e,
                        "Query shaping failed, using original filter"
                    );
                    return original;
                }
            };
        }

        shaped
    }

    /// Ask the resolved target whether to refuse an inbound message.
    pub fn on_reject_decision(&self, event: &Event) -> Verdict {
        match self.resolve_target(event) {
            Some(target) => target.creature().reject_decision(event),
            None => Verdict::accept(),
        }
    }

    /// Apply time-based decay to every hatched pet.
    pub fn decay_all(&self, now: DateTime<Utc>) {
        for pet in self.active_pets() {
            pet.creature().decay(now);
        }
    }

    fn announce(&self, entity: &Entity, about: &str) {
        match metadata_event(entity, about) {
            Ok(event) => self.outbox.publish_detached(event, "metadata"),
            Err(e) => warn!(pet_id = %entity.id(), error = %e, "Failed to sign metadata"),
        }
    }
}
