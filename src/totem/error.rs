use std::fmt;

/// Coordinator errors.
///
/// None of these are fatal: the registry and every pet stay usable after
/// any single failed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TotemError {
    /// Referenced entity identity does not exist
    NotFound(String),
    /// Entity is in the wrong lifecycle phase (e.g. naming a hatched pet)
    InvalidState(String),
    /// Ownership mismatch, or an egg with no recorded owner
    Unauthorized(String),
    /// Malformed or missing command parameters
    Validation(String),
    /// Publish attempted before a publish capability was wired up
    NotConfigured,
    /// Publish timed out or the relay refused it
    Transient(String),
    /// An outbound event could not be signed
    Signing(String),
}

impl fmt::Display for TotemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotemError::NotFound(id) => write!(f, "pet not found: {}", id),
            TotemError::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            TotemError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            TotemError::Validation(msg) => write!(f, "validation failed: {}", msg),
            TotemError::NotConfigured => write!(f, "no publish capability configured"),
            TotemError::Transient(msg) => write!(f, "publish failed: {}", msg),
            TotemError::Signing(msg) => write!(f, "signing failed: {}", msg),
        }
    }
}

impl std::error::Error for TotemError {}
