pub mod config;
pub mod error;
pub mod lifecycle;
pub mod provider_ollama;
pub mod pull_job;
pub mod routes_models;
pub mod routes_pull;
pub mod state;
pub mod status;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::{AppState, SharedState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ollama/status", get(routes_models::get_status))
        .route("/api/ollama/model/:name", get(routes_models::get_model))
        .route("/api/ollama/pull", post(routes_pull::post_pull))
        .route("/api/ollama/pull/active", get(routes_pull::get_active))
        .route("/api/ollama/pull/:name/progress", get(routes_pull::get_progress))
        .route("/api/ollama/load", post(routes_models::post_load))
        .route("/api/ollama/unload", post(routes_models::post_unload))
        .route("/api/ollama/delete", delete(routes_models::delete_model))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
