use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::error::ApiError;
use crate::state::SharedState;
use crate::types::{ActionResponse, ActiveDownloads, ModelRequest, ProgressResponse};

/// Waits for the pull to finish. The pull itself is detached, so a caller
/// that hangs up does not stop it.
pub async fn post_pull(
    State(st): State<SharedState>,
    payload: Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(req) = payload?;
    let name = req.require_name()?;
    Ok(Json(st.puller().pull(name).await?))
}

pub async fn get_active(State(st): State<SharedState>) -> Json<ActiveDownloads> {
    Json(ActiveDownloads {
        success: true,
        downloads: st.downloads.snapshot().await,
    })
}

pub async fn get_progress(
    State(st): State<SharedState>,
    Path(name): Path<String>,
) -> Json<ProgressResponse> {
    let resp = match st.downloads.get(&name).await {
        Some(progress) => ProgressResponse::Found {
            success: true,
            completed: progress.is_completed(),
            progress,
        },
        None => ProgressResponse::Missing {
            success: false,
            error: "No active download found for this model".to_string(),
        },
    };
    Json(resp)
}
