// NATS transport between the external relay and the coordinator

mod bridge;
mod client;
mod publisher;
#[cfg(test)]
mod tests;

pub use bridge::{dispatch, run_bridge, Hook};
pub use client::{NatsClient, NatsConfig};
pub use publisher::NatsPublisher;
