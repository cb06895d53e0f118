use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::error::ApiError;
use crate::lifecycle;
use crate::state::SharedState;
use crate::status;
use crate::types::{ActionResponse, ModelRequest, StatusReport};

pub async fn get_status(State(st): State<SharedState>) -> Json<StatusReport> {
    Json(status::get_status(&st.ollama).await)
}

pub async fn get_model(
    State(st): State<SharedState>,
    Path(name): Path<String>,
) -> Json<serde_json::Value> {
    Json(status::get_model_info(&st.ollama, &name).await)
}

pub async fn post_load(
    State(st): State<SharedState>,
    payload: Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(req) = payload?;
    let name = req.require_name()?.to_string();
    Ok(Json(
        lifecycle::load_model(&st.ollama, &name, req.options, req.keep_alive).await,
    ))
}

pub async fn post_unload(
    State(st): State<SharedState>,
    payload: Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(req) = payload?;
    let name = req.require_name()?;
    Ok(Json(lifecycle::unload_model(&st.ollama, name).await))
}

pub async fn delete_model(
    State(st): State<SharedState>,
    payload: Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(req) = payload?;
    let name = req.require_name()?;
    Ok(Json(lifecycle::delete_model(&st.ollama, name).await))
}
