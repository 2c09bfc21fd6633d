use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /
/// Welcome message with the API version.
pub async fn welcome_handler() -> Json<Value> {
    Json(json!({
        "apiVersion": "v1.0",
        "status": "200",
        "message": "Welcome to the CareerHub job registry API!"
    }))
}

/// GET /health
/// Pings the store and reports which backend is serving.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.store.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "job-registry",
        "store": state.store.backend()
    })))
}
