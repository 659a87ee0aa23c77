use super::{compute_id, Event};
use secp256k1::{schnorr, Message, XOnlyPublicKey, SECP256K1};
use std::fmt;

/// Validation errors for Event
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidId(String),
    InvalidPubkey(String),
    InvalidSignature(String),
    IdMismatch { expected: String, actual: String },
    SignatureMismatch,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidId(id) => {
                write!(f, "invalid id '{}': must be 64 lowercase hex chars", id)
            }
            ValidationError::InvalidPubkey(pk) => {
                write!(f, "invalid pubkey '{}': must be 64 lowercase hex chars", pk)
            }
            ValidationError::InvalidSignature(msg) => write!(f, "invalid signature: {}", msg),
            ValidationError::IdMismatch { expected, actual } => {
                write!(f, "id mismatch: computed {}, event has {}", expected, actual)
            }
            ValidationError::SignatureMismatch => write!(f, "signature does not verify"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates the shape of an event without touching cryptography.
///
/// Rules:
/// - id: 64 lowercase hex chars
/// - pubkey: 64 lowercase hex chars
/// - sig: 128 lowercase hex chars
pub fn validate_structure(event: &Event) -> Result<(), ValidationError> {
    if !is_lower_hex(&event.id, 64) {
        return Err(ValidationError::InvalidId(event.id.clone()));
    }
    if !is_lower_hex(&event.pubkey, 64) {
        return Err(ValidationError::InvalidPubkey(event.pubkey.clone()));
    }
    if !is_lower_hex(&event.sig, 128) {
        return Err(ValidationError::InvalidSignature(
            "must be 128 lowercase hex chars".to_string(),
        ));
    }
    Ok(())
}

/// Full check: structure, recomputed id, then Schnorr signature.
pub(super) fn verify(event: &Event) -> Result<(), ValidationError> {
    validate_structure(event)?;

    let expected = compute_id(
        &event.pubkey,
        event.created_at,
        event.kind,
        &event.tags,
        &event.content,
    )
    .map_err(|e| ValidationError::InvalidId(e.to_string()))?;
    if expected != event.id {
        return Err(ValidationError::IdMismatch {
            expected,
            actual: event.id.clone(),
        });
    }

    // Structure check above guarantees the hex decodes
    let digest = hex::decode(&event.id).map_err(|e| ValidationError::InvalidId(e.to_string()))?;
    let message =
        Message::from_slice(&digest).map_err(|e| ValidationError::InvalidId(e.to_string()))?;
    let pubkey_bytes =
        hex::decode(&event.pubkey).map_err(|e| ValidationError::InvalidPubkey(e.to_string()))?;
    let pubkey = XOnlyPublicKey::from_slice(&pubkey_bytes)
        .map_err(|e| ValidationError::InvalidPubkey(e.to_string()))?;
    let sig_bytes =
        hex::decode(&event.sig).map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;
    let sig = schnorr::Signature::from_slice(&sig_bytes)
        .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;

    SECP256K1
        .verify_schnorr(&sig, &message, &pubkey)
        .map_err(|_| ValidationError::SignatureMismatch)
}

fn is_lower_hex(value: &str, len: usize) -> bool {
    value.len() == len
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
