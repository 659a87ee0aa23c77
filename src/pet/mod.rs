//! Per-pet state machine.
//!
//! A pet lives in one of two phases, modelled as the [`Entity`] sum type:
//! an [`Egg`] (owned, unnamed, inert) and an [`ActivePet`] (named, decays,
//! reacts to traffic). Both expose the same [`Creature`] capabilities so the
//! coordinator can dispatch without caring which phase it holds.

use crate::event::{Event, Filter, Keys};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

mod active;
mod egg;
mod vitals;

pub use active::ActivePet;
pub use egg::Egg;
pub use vitals::{PetState, Vitals};

/// Below this energy a pet is exhausted and starts losing happiness
pub const LOW_ENERGY: f64 = 30.0;

/// Energy lost per second since the last feeding (R1)
pub const ENERGY_DECAY_PER_SEC: f64 = 0.001;

/// Happiness lost per second since the last feeding while exhausted (R2)
pub const HAPPINESS_DECAY_PER_SEC: f64 = 0.002;

/// Unhappy pets reject content longer than this many bytes
pub const GRUMPY_CONTENT_LEN: usize = 250;

/// Content shorter than this many bytes cheers a pet up
pub const SHORT_CONTENT_LEN: usize = 100;

/// Result ceiling a tired pet imposes on unbounded queries
pub const TIRED_QUERY_LIMIT: u64 = 10;

/// Display symbol derived from state; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Exhausted,
    Hungry,
    Sad,
    Neutral,
    Delighted,
    Content,
    Egg,
}

impl Mood {
    /// Mood of a hatched pet. Rules are checked in order, first match wins.
    pub fn from_state(state: &PetState) -> Self {
        match (state.energy, state.happiness) {
            (e, _) if e < LOW_ENERGY => Mood::Exhausted,
            (e, _) if e < 50.0 => Mood::Hungry,
            (_, h) if h < 30.0 => Mood::Sad,
            (_, h) if h < 50.0 => Mood::Neutral,
            (e, h) if h >= 80.0 && e >= 80.0 => Mood::Delighted,
            _ => Mood::Content,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Exhausted => "exhausted",
            Mood::Hungry => "hungry",
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Delighted => "delighted",
            Mood::Content => "content",
            Mood::Egg => "egg",
        }
    }

    /// Emoji published in the `state_emoji` status tag
    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Exhausted => "😫",
            Mood::Hungry => "😕",
            Mood::Sad => "😢",
            Mood::Neutral => "😐",
            Mood::Delighted => "🤗",
            Mood::Content => "😊",
            Mood::Egg => "🥚",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accept/reject answer for an inbound message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub reject: bool,
    pub reason: String,
}

impl Verdict {
    pub fn accept() -> Self {
        Self {
            reject: false,
            reason: String::new(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            reject: true,
            reason: reason.into(),
        }
    }
}

/// Behavior shared by both lifecycle phases.
pub trait Creature: Send + Sync {
    fn keys(&self) -> &Keys;

    /// Public key of whoever created the egg
    fn owner(&self) -> &str;

    fn vitals(&self) -> &Vitals;

    fn mood(&self) -> Mood;

    /// An inbound message was accepted and addressed to this pet.
    fn on_fed(&self, event: &Event, now: DateTime<Utc>);

    /// An event addressed to this pet was deleted.
    fn on_deleted(&self, event: &Event);

    /// Apply time-based decay as of `now`.
    fn decay(&self, now: DateTime<Utc>);

    fn reject_decision(&self, event: &Event) -> Verdict;

    /// Narrow a query filter. Consulting a pet may itself change its state.
    fn shape_query(&self, filter: Filter) -> Result<Filter, PetError>;

    fn state(&self) -> PetState {
        self.vitals().snapshot()
    }
}

/// A registry entry: one pet in its current lifecycle phase.
pub enum Entity {
    Egg(Egg),
    Pet(ActivePet),
}

impl Entity {
    pub fn creature(&self) -> &dyn Creature {
        match self {
            Entity::Egg(egg) => egg,
            Entity::Pet(pet) => pet,
        }
    }

    /// Registry key: the entity's hex public key
    pub fn id(&self) -> &str {
        self.creature().keys().public_key()
    }

    pub fn is_egg(&self) -> bool {
        matches!(self, Entity::Egg(_))
    }

    pub fn as_egg(&self) -> Option<&Egg> {
        match self {
            Entity::Egg(egg) => Some(egg),
            Entity::Pet(_) => None,
        }
    }

    pub fn as_pet(&self) -> Option<&ActivePet> {
        match self {
            Entity::Pet(pet) => Some(pet),
            Entity::Egg(_) => None,
        }
    }

    /// State and the mood it implies, from a single read
    pub fn snapshot(&self) -> (PetState, Mood) {
        let state = self.creature().state();
        let mood = match self {
            Entity::Egg(_) => Mood::Egg,
            Entity::Pet(_) => state.mood(),
        };
        (state, mood)
    }

    /// "egg" or "pet"
    pub fn phase(&self) -> &'static str {
        match self {
            Entity::Egg(_) => "egg",
            Entity::Pet(_) => "pet",
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("phase", &self.phase())
            .field("id", &self.id())
            .field("owner", &self.creature().owner())
            .field("state", &self.creature().state())
            .finish()
    }
}

/// Errors from pet capabilities
#[derive(Debug, Clone, PartialEq)]
pub enum PetError {
    /// A writer panicked while holding this pet's state lock
    Poisoned(String),
}

impl fmt::Display for PetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetError::Poisoned(id) => write!(f, "state lock poisoned for pet {}", id),
        }
    }
}

impl std::error::Error for PetError {}
