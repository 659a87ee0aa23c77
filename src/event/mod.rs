use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

mod filter;
mod keys;
mod validation;
#[cfg(test)]
mod tests;

pub use filter::Filter;
pub use keys::{Keys, SignError};
pub use validation::{validate_structure, ValidationError};

/// Profile metadata (NIP-01 kind 0)
pub const KIND_METADATA: u16 = 0;

/// Reserved "tool execution" kind carrying pet lifecycle commands
pub const KIND_PET_COMMAND: u16 = 5910;

/// Addressable application data used for periodic pet status
pub const KIND_PET_STATUS: u16 = 30078;

/// Tag naming the entity a message is addressed to
pub const TAG_PUBKEY: &str = "p";

/// Event is a signed, timestamped unit of relay traffic (NIP-01).
///
/// Serializes to exactly the NIP-01 JSON shape so it can be handed to or
/// received from any relay unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Lowercase hex SHA-256 of the canonical serialization
    pub id: String,

    /// Author's x-only public key (64 lowercase hex chars)
    pub pubkey: String,

    /// Unix timestamp in seconds
    pub created_at: u64,

    pub kind: u16,

    /// Array of string arrays, first element is the tag name
    pub tags: Vec<Vec<String>>,

    pub content: String,

    /// Schnorr signature over `id` (128 lowercase hex chars)
    pub sig: String,
}

/// Unsigned event body; the author key is supplied at signing time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventTemplate {
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

impl EventTemplate {
    /// Template stamped with the current time
    pub fn new(kind: u16, content: impl Into<String>) -> Self {
        Self {
            created_at: unix_now(),
            kind,
            tags: Vec::new(),
            content: content.into(),
        }
    }

    /// Append a `[name, value]` tag
    pub fn tag(mut self, name: &str, value: impl Into<String>) -> Self {
        self.tags.push(vec![name.to_string(), value.into()]);
        self
    }
}

impl Event {
    /// First value of the first tag called `name`
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.len() >= 2 && tag[0] == name)
            .map(|tag| tag[1].as_str())
    }

    /// All values of tags called `name`, in order
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.len() >= 2 && tag[0] == name)
            .map(|tag| tag[1].as_str())
    }

    /// True if some tag is exactly `[name, value, ...]`
    pub fn has_tag(&self, name: &str, value: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.len() >= 2 && tag[0] == name && tag[1] == value)
    }

    /// Content length in bytes, the unit pets judge messages by
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Recompute the id and check the signature.
    pub fn verify(&self) -> Result<(), ValidationError> {
        validation::verify(self)
    }
}

/// Hex SHA-256 over `[0, pubkey, created_at, kind, tags, content]`.
pub fn compute_id(
    pubkey: &str,
    created_at: u64,
    kind: u16,
    tags: &[Vec<String>],
    content: &str,
) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(&(0, pubkey, created_at, kind, tags, content))?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
