// Read-only HTTP inspection API

pub mod pets;

pub use pets::{create_pets_router, PetsAppState};
