use crate::event::{Event, EventTemplate, SignError, KIND_METADATA, KIND_PET_STATUS, TAG_PUBKEY};
use crate::pet::Entity;
use serde_json::json;

/// `d` tag value addressing the replaceable status record
pub const STATUS_D_TAG: &str = "pet/status";

/// Profile metadata for an entity, signed by the entity itself.
pub fn metadata_event(entity: &Entity, about: &str) -> Result<Event, SignError> {
    let creature = entity.creature();
    let content = json!({
        "name": creature.state().name,
        "about": about,
    });

    creature.keys().sign(
        EventTemplate::new(KIND_METADATA, content.to_string()).tag(TAG_PUBKEY, creature.owner()),
    )
}

/// Periodic status record: numbers and mood as tags, a one-line summary as content.
pub fn status_event(entity: &Entity) -> Result<Event, SignError> {
    let (state, mood) = entity.snapshot();

    let template = EventTemplate::new(
        KIND_PET_STATUS,
        format!("{} is feeling {} {}", state.name, mood, mood.emoji()),
    )
    .tag("d", STATUS_D_TAG)
    .tag("energy", format!("{:.1}", state.energy))
    .tag("happiness", format!("{:.1}", state.happiness))
    .tag("last_fed", state.last_fed.timestamp().to_string())
    .tag("name", state.name.clone())
    .tag("state_emoji", mood.emoji());

    entity.creature().keys().sign(template)
}
