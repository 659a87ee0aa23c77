// Relay message model, keys and signing
pub mod event;

// Lifecycle commands carried in relay messages
pub mod command;

// Per-pet state machine
pub mod pet;

// Pet registry and traffic coordinator
pub mod totem;

// Decay and status publication loops
pub mod status;

// Relay hook surface and storage
pub mod relay;

// NATS transport for the relay boundary
pub mod nats;

// HTTP inspection API
pub mod api;

// TOML configuration
pub mod config;
