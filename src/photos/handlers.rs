use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::CoreError,
    identity::extractors::AuthSession,
    photos::services::{presign_photo, upload_photo},
    state::AppState,
    storage::StorageClient,
};

#[derive(Debug, Deserialize)]
pub struct UploadPhotoRequest {
    pub image: serde_bytes::ByteBuf,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "image/jpeg".into()
}

#[derive(Debug, Serialize)]
pub struct UploadPhotoResponse {
    pub photo_ref: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/photos", post(upload))
        .route("/issues/:id/photo", get(get_presigned_photo))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

fn storage(state: &AppState) -> Result<Arc<dyn StorageClient>, CoreError> {
    state
        .storage
        .clone()
        .ok_or_else(|| CoreError::StorageUnavailable("photo storage is not configured".into()))
}

#[instrument(skip(state, session, body))]
pub async fn upload(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(body): Json<UploadPhotoRequest>,
) -> Result<(StatusCode, Json<UploadPhotoResponse>), CoreError> {
    let user_id = session.require_user()?.id;
    let storage = storage(&state)?;
    let photo_ref = upload_photo(
        storage.as_ref(),
        user_id,
        Bytes::from(body.image.into_vec()),
        &body.content_type,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(UploadPhotoResponse { photo_ref })))
}

/// 307 to a presigned URL for the issue's photo.
#[instrument(skip(state))]
pub async fn get_presigned_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, CoreError> {
    let issue = state.projections.issue(id).await?;
    let key = issue.photo_ref.ok_or(CoreError::NotFound)?;
    let storage = storage(&state)?;
    let url = presign_photo(storage.as_ref(), &key).await?;
    Ok(Redirect::temporary(&url))
}
