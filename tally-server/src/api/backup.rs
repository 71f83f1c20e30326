//! Backup management endpoints
//!
//! Filesystem work happens in `spawn_blocking` so a large database copy
//! does not stall the runtime.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use serde_json::json;
use shared::AppError;

use super::{ApiResult, Json, message};
use crate::services::backup::{BackupConfig, BackupInfo};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/config", get(get_config).put(put_config))
        .route("/restore/{filename}", post(restore))
        .route("/download/{filename}", get(download))
        .route("/{filename}", axum::routing::delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<axum::Json<Vec<BackupInfo>>> {
    let backups = state.backups.clone();
    let list = tokio::task::spawn_blocking(move || backups.list())
        .await
        .map_err(|e| AppError::internal(format!("backup task panicked: {e}")))??;
    Ok(axum::Json(list))
}

async fn create(State(state): State<AppState>) -> ApiResult<(StatusCode, axum::Json<BackupInfo>)> {
    let backups = state.backups.clone();
    let info = tokio::task::spawn_blocking(move || backups.create_manual())
        .await
        .map_err(|e| AppError::internal(format!("backup task panicked: {e}")))??;
    Ok((StatusCode::CREATED, axum::Json(info)))
}

async fn restore(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    let backups = state.backups.clone();
    tokio::task::spawn_blocking(move || backups.restore(&filename))
        .await
        .map_err(|e| AppError::internal(format!("backup task panicked: {e}")))??;
    Ok(message("restored; restart the server to apply"))
}

async fn remove(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    state.backups.delete(&filename)?;
    Ok(message("deleted"))
}

async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.backups.backup_path(&filename)?;
    let bytes = tokio::fs::read(&path).await?;
    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        )
        .body(axum::body::Body::from(bytes))
        .map_err(|e| AppError::internal(format!("response build failed: {e}")))
}

async fn get_config(State(state): State<AppState>) -> axum::Json<BackupConfig> {
    axum::Json(state.backups.config())
}

async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<BackupConfig>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    let applied = state.backups.update_config(config)?;
    Ok(axum::Json(json!({ "message": "config updated", "config": applied })))
}
