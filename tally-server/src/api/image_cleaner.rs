//! Orphaned-upload maintenance endpoints

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};

use super::ApiResult;
use crate::services::image_cleaner::{self, CleanReport, CleanerStats};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/clean", post(clean))
}

async fn stats(State(state): State<AppState>) -> ApiResult<axum::Json<CleanerStats>> {
    Ok(axum::Json(
        image_cleaner::stats(&state.pool, &state.config.upload_dir).await?,
    ))
}

async fn clean(State(state): State<AppState>) -> ApiResult<axum::Json<CleanReport>> {
    Ok(axum::Json(
        image_cleaner::clean(&state.pool, &state.config.upload_dir).await?,
    ))
}
