use crate::pet::{Creature, Entity};
use crate::relay::RelayInfo;
use crate::totem::Totem;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the inspection API
pub struct PetsAppState {
    pub totem: Arc<Totem>,
    pub relay_info: RelayInfo,
}

/// Query parameters for pet listing
#[derive(Deserialize)]
pub struct PetQueryParams {
    /// Only entities created by this public key
    pub owner: Option<String>,
}

/// One entity as seen from outside
#[derive(Debug, Serialize, Deserialize)]
pub struct PetResponse {
    pub id: String,
    pub phase: String,
    pub owner: String,
    pub name: String,
    pub energy: f64,
    pub happiness: f64,
    #[serde(rename = "lastFed")]
    pub last_fed: String,
    pub mood: String,
    pub emoji: String,
}

impl From<&Entity> for PetResponse {
    fn from(entity: &Entity) -> Self {
        let (state, mood) = entity.snapshot();

        Self {
            id: entity.id().to_string(),
            phase: entity.phase().to_string(),
            owner: entity.creature().owner().to_string(),
            name: state.name,
            energy: state.energy,
            happiness: state.happiness,
            last_fed: state.last_fed.to_rfc3339(),
            mood: mood.to_string(),
            emoji: mood.emoji().to_string(),
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create inspection API router
pub fn create_pets_router(state: Arc<PetsAppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/relay", get(relay_info))
        .route("/api/pets", get(list_pets))
        .route("/api/pets/:id", get(get_pet))
        .with_state(state)
}

/// GET /health
async fn health(State(state): State<Arc<PetsAppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "pets": state.totem.len(),
        "publisher": state.totem.has_publisher(),
    }))
}

/// GET /api/relay - Relay information document
async fn relay_info(State(state): State<Arc<PetsAppState>>) -> Json<RelayInfo> {
    Json(state.relay_info.clone())
}

/// GET /api/pets - List entities ordered by identity
///
/// Query parameters:
/// - `owner`: only entities created by this public key
async fn list_pets(
    State(state): State<Arc<PetsAppState>>,
    Query(params): Query<PetQueryParams>,
) -> Json<Vec<PetResponse>> {
    let pets = state
        .totem
        .entities()
        .iter()
        .filter(|entity| match params.owner {
            Some(ref owner) => entity.creature().owner() == owner.as_str(),
            None => true,
        })
        .map(|entity| PetResponse::from(entity.as_ref()))
        .collect();

    Json(pets)
}

/// GET /api/pets/:id - One entity by hex public key
async fn get_pet(
    State(state): State<Arc<PetsAppState>>,
    Path(id): Path<String>,
) -> Result<Json<PetResponse>, PetsError> {
    let entity = state.totem.get(&id).ok_or(PetsError::NotFound)?;
    Ok(Json(PetResponse::from(entity.as_ref())))
}

#[derive(Debug)]
enum PetsError {
    NotFound,
}

impl IntoResponse for PetsError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            PetsError::NotFound => (StatusCode::NOT_FOUND, "Pet not found"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}
