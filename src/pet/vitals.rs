use super::Mood;
use super::PetError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};

/// A pet's numeric state.
///
/// `energy` and `happiness` live in `[0, 100]`; every write through
/// [`Vitals`] re-clamps them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PetState {
    pub name: String,
    pub happiness: f64,
    pub energy: f64,
    pub last_fed: DateTime<Utc>,
}

impl PetState {
    /// Fresh state: full energy and happiness, fed at `now`
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            happiness: 100.0,
            energy: 100.0,
            last_fed: now,
        }
    }

    /// Seconds between the last feeding and `now`, never negative
    pub fn seconds_since_fed(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - self.last_fed).num_milliseconds() as f64 / 1000.0;
        elapsed.max(0.0)
    }

    /// Mood derived from the numbers alone (eggs override this)
    pub fn mood(&self) -> Mood {
        Mood::from_state(self)
    }

    fn clamp(&mut self) {
        self.energy = self.energy.clamp(0.0, 100.0);
        self.happiness = self.happiness.clamp(0.0, 100.0);
    }
}

/// Lock-guarded [`PetState`], one per pet.
///
/// Callers that also need the registry lock must take it first; a pet's
/// lock is never held while acquiring the registry lock.
#[derive(Debug)]
pub struct Vitals {
    state: RwLock<PetState>,
}

impl Vitals {
    pub fn new(mut state: PetState) -> Self {
        state.clamp();
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PetState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate under the write lock, clamping afterwards.
    ///
    /// A poisoned lock is recovered: the state is plain numbers and stays
    /// meaningful after a panicking writer.
    pub fn update<R>(&self, f: impl FnOnce(&mut PetState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut guard);
        guard.clamp();
        result
    }

    /// Like [`Vitals::update`] but reports a poisoned lock instead of recovering.
    pub fn try_update<R>(&self, f: impl FnOnce(&mut PetState) -> R) -> Result<R, PetError> {
        match self.state.write() {
            Ok(mut guard) => {
                let result = f(&mut guard);
                guard.clamp();
                Ok(result)
            }
            Err(poisoned) => Err(PetError::Poisoned(poisoned.into_inner().name.clone())),
        }
    }
}
