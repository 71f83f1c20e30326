//! Cross-device photo upload endpoints
//!
//! Lifecycle: the desktop POSTs a session and polls its status; the phone
//! POSTs the photo against the session id; either side may DELETE it.

use axum::Router;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::json;
use shared::AppError;

use super::{ApiResult, message};
use crate::services::image;
use crate::services::upload_session::{SessionStatus, SessionTicket};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(status).delete(remove))
        .route("/{id}/upload", post(upload))
}

async fn create(State(state): State<AppState>) -> (StatusCode, axum::Json<SessionTicket>) {
    let ticket = state.sessions.create().await;
    (StatusCode::CREATED, axum::Json(ticket))
}

async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<axum::Json<SessionStatus>> {
    let status = state
        .sessions
        .status(&id)
        .await
        .ok_or_else(|| AppError::not_found("session missing or expired"))?;
    Ok(axum::Json(status))
}

async fn upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<axum::Json<serde_json::Value>> {
    // reject before doing any image work
    if state.sessions.status(&id).await.is_none() {
        return Err(AppError::not_found("session missing or expired"));
    }

    let mut uploaded = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("photo") {
            let data = field.bytes().await?;
            if !data.is_empty() {
                uploaded = Some(image::save(&state.config.upload_dir, &data)?);
            }
        }
    }
    let mut file = uploaded.ok_or_else(|| AppError::validation("no file uploaded"))?;
    // reverse-proxy deployments need an absolute URL the phone can reach
    file.url = state.config.public_url(&file.url);

    // the session can expire while the image is being processed
    if !state.sessions.attach(&id, file.clone()).await {
        let _ = std::fs::remove_file(&file.path);
        return Err(AppError::not_found("session missing or expired"));
    }

    Ok(axum::Json(json!({ "message": "uploaded", "file": file })))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> axum::Json<serde_json::Value> {
    state.sessions.remove(&id).await;
    message("session removed")
}
