mod error;

pub use error::{ApiError, ErrorCode, ValidationErrorBuilder};

use axum::{extract::State, routing::get, routing::post, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::intent::{dispatch, IntentRequest, IntentResponse};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/intent", post(handle_intent))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Validate the normalized intent envelope before dispatching.
fn validate_request(req: &IntentRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if req.intent_name.trim().is_empty() {
        errors.add("intent_name", "Intent name is required");
    }

    if req.external_user_token.trim().is_empty() {
        errors.add("external_user_token", "User token is required");
    }

    errors.finish()
}

/// Handle one normalized intent from the voice platform.
///
/// POST /intent
pub async fn handle_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IntentRequest>,
) -> Result<Json<IntentResponse>, ApiError> {
    validate_request(&req)?;

    Ok(Json(dispatch(&state, &req).await))
}
