//! Lifecycle commands embedded in relay messages.
//!
//! A message is a command only when it has kind [`KIND_PET_COMMAND`] and a
//! `["c", "execute-tool"]` tag. Its content is JSON:
//!
//! ```json
//! {"name": "create_egg", "parameters": {}}
//! {"name": "name_pet", "parameters": {"name": "Rex", "pet_id": "<optional hex pubkey>"}}
//! ```

use crate::event::{Event, KIND_PET_COMMAND};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;


/// Tag name marking the command channel
pub const TAG_COMMAND: &str = "c";

/// Tag value marking a tool-execution request
pub const TAG_EXECUTE_TOOL: &str = "execute-tool";

pub const CMD_CREATE_EGG: &str = "create_egg";
pub const CMD_NAME_PET: &str = "name_pet";

/// Raw command envelope as it appears in message content
#[derive(Clone, Debug, Deserialize)]
pub struct CommandRequest {
    pub name: String,

    /// Opaque until the command name is known
    #[serde(default)]
    pub parameters: Value,
}

/// Parameters of `name_pet`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NamePetParams {
    #[serde(default)]
    pub name: String,

    /// Identity of the egg to hatch; the author's first egg when absent
    #[serde(default)]
    pub pet_id: Option<String>,
}

impl NamePetParams {
    /// Explicit target, treating an empty string as "not supplied"
    pub fn target(&self) -> Option<&str> {
        self.pet_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A validated command
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateEgg,
    NamePet(NamePetParams),
    /// Recognized envelope with a name nobody handles
    Unknown(String),
}

/// Recognition gate: reserved kind plus the execute-tool tag.
pub fn is_command(event: &Event) -> bool {
    event.kind == KIND_PET_COMMAND && event.has_tag(TAG_COMMAND, TAG_EXECUTE_TOOL)
}

/// Parse message content into a command envelope.
pub fn parse_request(content: &str) -> Result<CommandRequest, CommandError> {
    serde_json::from_str(content).map_err(|e| CommandError::Malformed(e.to_string()))
}

impl CommandRequest {
    /// Decode and validate parameters for the named command.
    ///
    /// `create_egg` ignores its parameters entirely.
    pub fn into_command(self) -> Result<Command, CommandError> {
        match self.name.as_str() {
            CMD_CREATE_EGG => Ok(Command::CreateEgg),
            CMD_NAME_PET => {
                let params: NamePetParams = serde_json::from_value(self.parameters)
                    .map_err(|e| CommandError::InvalidParameters(e.to_string()))?;
                if params.name.trim().is_empty() {
                    return Err(CommandError::MissingName);
                }
                Ok(Command::NamePet(params))
            }
            _ => Ok(Command::Unknown(self.name)),
        }
    }
}

/// Command parsing and validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Content is not a JSON command envelope
    Malformed(String),
    /// Parameters do not decode for the named command
    InvalidParameters(String),
    /// `name_pet` without a non-empty `name`
    MissingName,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Malformed(e) => write!(f, "invalid command format: {}", e),
            CommandError::InvalidParameters(e) => write!(f, "invalid name_pet parameters: {}", e),
            CommandError::MissingName => write!(f, "name parameter is required"),
        }
    }
}

impl std::error::Error for CommandError {}
