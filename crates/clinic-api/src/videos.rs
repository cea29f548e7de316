use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use clinic_types::api::{AddVideoRequest, AddVideoResponse, MessageResponse};
use clinic_types::models::Video;

use crate::error::ApiError;
use crate::state::AppState;
use crate::{rows, run_blocking};

/// POST /api/add-video. Metadata is stored as given.
pub async fn add_video(
    State(state): State<AppState>,
    Json(req): Json<AddVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let id = run_blocking(move || db.insert_video(&req.title, &req.description, &req.url))
        .await
        .map_err(ApiError::Persistence)?;

    info!("Video {} added", id);
    Ok((
        StatusCode::CREATED,
        Json(AddVideoResponse {
            message: "Video added successfully!".into(),
            id,
        }),
    ))
}

/// GET /api/get-videos, newest first.
pub async fn list_videos(State(state): State<AppState>) -> Result<Json<Vec<Video>>, ApiError> {
    let db = state.db.clone();
    let records = run_blocking(move || db.list_videos())
        .await
        .map_err(ApiError::StoreUnavailable)?;

    Ok(Json(records.into_iter().filter_map(rows::video).collect()))
}

/// DELETE /api/delete-video/{id}
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let db = state.db.clone();
    let deleted = run_blocking(move || db.delete_video(id))
        .await
        .map_err(ApiError::StoreUnavailable)?;

    if !deleted {
        return Err(ApiError::NotFound("Video"));
    }

    info!("Video {} deleted", id);
    Ok(Json(MessageResponse::new("Video deleted successfully")))
}
