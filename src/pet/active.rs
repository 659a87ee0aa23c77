use super::{
    Creature, Mood, PetError, PetState, Verdict, Vitals, ENERGY_DECAY_PER_SEC,
    GRUMPY_CONTENT_LEN, HAPPINESS_DECAY_PER_SEC, LOW_ENERGY, SHORT_CONTENT_LEN,
    TIRED_QUERY_LIMIT,
};
use crate::event::{Event, Filter, Keys};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Energy a pet gains from cleaning up after a deletion, when below half
const DELETE_ENERGY_BOOST: f64 = 2.0;

/// Energy spent every time a pet is asked to shape a query
const QUERY_SHAPE_COST: f64 = 0.1;

/// A named pet: decays, eats messages, rejects and shapes traffic.
#[derive(Debug)]
pub struct ActivePet {
    keys: Arc<Keys>,
    owner: String,
    vitals: Arc<Vitals>,
}

impl ActivePet {
    /// A brand-new pet with full energy and happiness
    pub fn new(keys: Keys, owner: impl Into<String>, name: &str, now: DateTime<Utc>) -> Self {
        Self::from_parts(
            Arc::new(keys),
            owner.into(),
            Arc::new(Vitals::new(PetState::new(name, now))),
        )
    }

    pub(super) fn from_parts(keys: Arc<Keys>, owner: String, vitals: Arc<Vitals>) -> Self {
        Self {
            keys,
            owner,
            vitals,
        }
    }
}

/// Nutrition of a message: a base of 10, more for longer content and
/// more tags, capped at 20.
pub fn nutrition(event: &Event) -> f64 {
    let value = 10.0 + event.content_len() as f64 * 0.1 + event.tags.len() as f64 * 2.0;
    value.min(20.0)
}

impl Creature for ActivePet {
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
        self.vitals.snapshot().mood()
    }

    fn on_fed(&self, event: &Event, now: DateTime<Utc>) {
        let food = nutrition(event);
        let short = event.content_len() < SHORT_CONTENT_LEN;

        let name = self.vitals.update(|state| {
            state.energy += food;
            if short {
                state.happiness += food * 0.5;
            }
            if now > state.last_fed {
                state.last_fed = now;
            }
            state.name.clone()
        });

        debug!(pet = %name, event_id = %event.id, nutrition = food, "Pet fed");
    }

    fn on_deleted(&self, event: &Event) {
        let boosted = self.vitals.update(|state| {
            if state.energy < 50.0 {
                state.energy += DELETE_ENERGY_BOOST;
                true
            } else {
                false
            }
        });

        debug!(
            pet_id = %self.keys.public_key(),
            event_id = %event.id,
            boosted,
            "Pet notified of deletion"
        );
    }

    fn decay(&self, now: DateTime<Utc>) {
        self.vitals.update(|state| {
            let elapsed = state.seconds_since_fed(now);
            state.energy = (state.energy - ENERGY_DECAY_PER_SEC * elapsed).max(0.0);
            if state.energy < LOW_ENERGY {
                state.happiness = (state.happiness - HAPPINESS_DECAY_PER_SEC * elapsed).max(0.0);
            }
        });
    }

    fn reject_decision(&self, event: &Event) -> Verdict {
        let state = self.vitals.snapshot();

        if state.happiness < 50.0 && event.content_len() > GRUMPY_CONTENT_LEN {
            info!(pet = %state.name, event_id = %event.id, "Pet rejecting long message");
            return Verdict::reject(format!(
                "{} is grumpy, dislikes long messages",
                state.name
            ));
        }

        Verdict::accept()
    }

    fn shape_query(&self, mut filter: Filter) -> Result<Filter, PetError> {
        let (tired, name) = self.vitals.try_update(|state| {
            let tired = state.energy < LOW_ENERGY;
            state.energy -= QUERY_SHAPE_COST;
            (tired, state.name.clone())
        })?;

        if tired && filter.limit.is_none() {
            filter.limit = Some(TIRED_QUERY_LIMIT);
            info!(pet = %name, limit = TIRED_QUERY_LIMIT, "Pet is tired, limiting results");
        }

        Ok(filter)
    }
}
