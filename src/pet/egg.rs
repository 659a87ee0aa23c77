use super::{ActivePet, Creature, Mood, PetError, PetState, Verdict, Vitals};
use crate::event::{Event, Filter, Keys};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Name every egg carries until it hatches
pub const EGG_NAME: &str = "Egg";

/// Energy an egg gains from any message routed to it
const EGG_FEED_ENERGY: f64 = 0.5;

/// A pet before naming. Owned, does not decay, can only hatch.
#[derive(Debug)]
pub struct Egg {
    keys: Arc<Keys>,
    owner: String,
    vitals: Arc<Vitals>,
}

impl Egg {
    pub fn new(keys: Keys, owner: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            keys: Arc::new(keys),
            owner: owner.into(),
            vitals: Arc::new(Vitals::new(PetState::new(EGG_NAME, now))),
        }
    }

    /// Build the named pet this egg turns into.
    ///
    /// The pet shares this egg's keys and [`Vitals`], so a write through a
    /// stale handle to the egg still lands on the pet. The name is set and
    /// the feeding clock restarts at `now`; replacing the egg in the
    /// registry is the coordinator's job.
    pub fn hatch(&self, name: &str, now: DateTime<Utc>) -> ActivePet {
        self.vitals.update(|state| {
            state.name = name.to_string();
            state.last_fed = now;
        });
        ActivePet::from_parts(
            Arc::clone(&self.keys),
            self.owner.clone(),
            Arc::clone(&self.vitals),
        )
    }
}

impl Creature for Egg {
    fn keys(&self) -> &Keys {
        &self.keys
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn mood(&self) -> Mood {
        Mood::Egg
    }

    fn on_fed(&self, event: &Event, _now: DateTime<Utc>) {
        self.vitals.update(|state| state.energy += EGG_FEED_ENERGY);
        debug!(pet_id = %self.keys.public_key(), event_id = %event.id, "Egg nudged by event");
    }

    fn on_deleted(&self, _event: &Event) {}

    fn decay(&self, _now: DateTime<Utc>) {}

    fn reject_decision(&self, _event: &Event) -> Verdict {
        Verdict::accept()
    }

    fn shape_query(&self, filter: Filter) -> Result<Filter, PetError> {
        Ok(filter)
    }
}
