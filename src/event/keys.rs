//! Entity key material and BIP-340 event signing.
//!
//! Every pet owns one keypair for its whole life; the x-only public key is
//! its registry identity and the author of everything it publishes.

use super::{compute_id, Event, EventTemplate};
use secp256k1::{KeyPair, Message, SECP256K1};
use std::fmt;

/// A secp256k1 keypair able to sign events.
pub struct Keys {
    keypair: KeyPair,
    public_key: String,
}

impl Keys {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let keypair = KeyPair::new(SECP256K1, &mut rand::thread_rng());
        Self::from_keypair(keypair)
    }

    /// Load a keypair from a 64-char hex secret key.
    #[cfg(test)]
    pub(crate) fn from_secret_hex(secret: &str) -> Result<Self, SignError> {
        let bytes = hex::decode(secret).map_err(|e| SignError::InvalidKey(e.to_string()))?;
        let keypair = KeyPair::from_seckey_slice(SECP256K1, &bytes)
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;
        Ok(Self::from_keypair(keypair))
    }

    fn from_keypair(keypair: KeyPair) -> Self {
        let (xonly, _parity) = keypair.x_only_public_key();
        Self {
            keypair,
            public_key: hex::encode(xonly.serialize()),
        }
    }

    /// Hex x-only public key
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Hash and sign a template, producing a complete event authored by these keys.
    pub fn sign(&self, template: EventTemplate) -> Result<Event, SignError> {
        let id = compute_id(
            &self.public_key,
            template.created_at,
            template.kind,
            &template.tags,
            &template.content,
        )
        .map_err(|e| SignError::Serialization(e.to_string()))?;

        let digest = hex::decode(&id).map_err(|e| SignError::Serialization(e.to_string()))?;
        let message =
            Message::from_slice(&digest).map_err(|e| SignError::Serialization(e.to_string()))?;
        let sig = SECP256K1.sign_schnorr_no_aux_rand(&message, &self.keypair);

        Ok(Event {
            id,
            pubkey: self.public_key.clone(),
            created_at: template.created_at,
            kind: template.kind,
            tags: template.tags,
            content: template.content,
            sig: sig.to_string(),
        })
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret half never leaves this type
        f.debug_struct("Keys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Errors raised while producing a signed event
#[derive(Debug, Clone, PartialEq)]
pub enum SignError {
    InvalidKey(String),
    Serialization(String),
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignError::InvalidKey(msg) => write!(f, "invalid secret key: {}", msg),
            SignError::Serialization(msg) => write!(f, "failed to serialize event: {}", msg),
        }
    }
}

impl std::error::Error for SignError {}
