pub mod health;

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::jobs::handlers;
use crate::state::AppState;

/// Body returned for any path or method the API does not serve.
async fn route_not_supported() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "err": {
                "msg": "This route is currently not supported."
            }
        })),
    )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(health::welcome_handler).fallback(route_not_supported),
        )
        .route(
            "/health",
            get(health::health_handler).fallback(route_not_supported),
        )
        .route(
            "/create/jobPost",
            post(handlers::handle_create_job).fallback(route_not_supported),
        )
        .route(
            "/search_by_job_id/:job_id",
            get(handlers::handle_search_by_job_id).fallback(route_not_supported),
        )
        .route(
            "/update_by_job_title",
            post(handlers::handle_update_by_job_title).fallback(route_not_supported),
        )
        .route(
            "/delete_by_job_title",
            delete(handlers::handle_delete_by_job_title).fallback(route_not_supported),
        )
        .route(
            "/jobs_by_salary",
            get(handlers::handle_jobs_by_salary).fallback(route_not_supported),
        )
        .route(
            "/jobs_by_experience_level",
            get(handlers::handle_jobs_by_experience_level).fallback(route_not_supported),
        )
        .route(
            "/top_companies_by_industry",
            get(handlers::handle_top_companies_by_industry).fallback(route_not_supported),
        )
        .fallback(route_not_supported)
        .with_state(state)
}
