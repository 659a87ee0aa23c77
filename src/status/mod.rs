//! Periodic background work: decay ticks and status publication.

use crate::totem::Totem;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

mod message;

pub use message::{metadata_event, status_event, STATUS_D_TAG};

/// Apply decay to every hatched pet once per tick.
pub async fn run_decay_loop(totem: Arc<Totem>, every: Duration) {
    let mut ticker = interval(every);

    // Skip missed ticks; decay is measured from last_fed so none are lost
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        totem.decay_all(Utc::now());
    }
}

/// Publish a status record for every hatched pet once per tick.
pub async fn run_status_loop(totem: Arc<Totem>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_secs = every.as_secs(), "Status publisher started");

    loop {
        ticker.tick().await;
        let published = publish_statuses(&totem).await;
        debug!(published, "Status round complete");
    }
}

/// One status round. Pets are published concurrently and a failure for one
/// never holds up the rest. Returns how many were published.
pub async fn publish_statuses(totem: &Totem) -> usize {
    let pets = totem.active_pets();
    if pets.is_empty() {
        return 0;
    }

    let rounds = pets.iter().map(|pet| async move {
        let event = match status_event(pet) {
            Ok(event) => event,
            Err(e) => {
                warn!(pet_id = %pet.id(), error = %e, "Failed to sign status");
                return false;
            }
        };

        match totem.publish(&event).await {
            Ok(()) => true,
            Err(e) => {
                warn!(pet_id = %pet.id(), error = %e, "Failed to publish status");
                false
            }
        }
    });

    join_all(rounds).await.into_iter().filter(|ok| *ok).count()
}
