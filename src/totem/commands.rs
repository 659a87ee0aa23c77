use super::{Totem, TotemError};
use crate::command::{self, Command, NamePetParams};
use crate::event::Event;
use crate::pet::Creature;
use serde::Serialize;
use tracing::warn;

/// Outcome of a successfully executed command
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandReply {
    EggCreated { pet_id: String },
    PetNamed { pet_id: String, name: String },
    /// Recognized envelope, unknown command name
    Ignored { command: String },
}

impl Totem {
    /// Run the command carried by `event`, if it carries one.
    ///
    /// `None` means the event is not a command (wrong kind or tag, or a body
    /// that is not a command request) and should be treated as a regular
    /// message. `Some` means the event was consumed as a command.
    pub fn execute_command(&self, event: &Event) -> Option<Result<CommandReply, TotemError>> {
        if !command::is_command(event) {
            return None;
        }

        let request = match command::parse_request(&event.content) {
            Ok(request) => request,
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Unparseable command, treating as message");
                return None;
            }
        };

        let outcome = match request.into_command() {
            Ok(Command::CreateEgg) => {
                let egg = self.create_egg(&event.pubkey);
                Ok(CommandReply::EggCreated {
                    pet_id: egg.id().to_string(),
                })
            }
            Ok(Command::NamePet(params)) => self.name_pet_for(event, &params),
            Ok(Command::Unknown(name)) => {
                warn!(event_id = %event.id, command = %name, "Unknown command");
                Ok(CommandReply::Ignored { command: name })
            }
            Err(e) => Err(TotemError::Validation(e.to_string())),
        };

        Some(outcome)
    }

    /// `name_pet` on behalf of the event author.
    ///
    /// An explicit target must be an egg the author owns; otherwise the
    /// author's first egg is named.
    fn name_pet_for(
        &self,
        event: &Event,
        params: &NamePetParams,
    ) -> Result<CommandReply, TotemError> {
        let pet_id = match params.target() {
            Some(pet_id) => {
                let entity = self
                    .get(pet_id)
                    .ok_or_else(|| TotemError::NotFound(pet_id.to_string()))?;
                let egg = entity.as_egg().ok_or_else(|| {
                    TotemError::InvalidState(format!("{} has already hatched", pet_id))
                })?;
                if egg.owner() != event.pubkey {
                    return Err(TotemError::Unauthorized(format!(
                        "{} does not own {}",
                        event.pubkey, pet_id
                    )));
                }
                pet_id.to_string()
            }
            None => self
                .find_eggs_by_owner(&event.pubkey)
                .first()
                .map(|egg| egg.id().to_string())
                .ok_or_else(|| {
                    TotemError::NotFound(format!("no egg owned by {}", event.pubkey))
                })?,
        };

        self.name_pet(&pet_id, &params.name)?;
        Ok(CommandReply::PetNamed {
            pet_id,
            name: params.name.clone(),
        })
    }
}
