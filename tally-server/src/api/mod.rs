//! HTTP surface
//!
//! One router per resource, nested under `/api`. Handlers stay thin:
//! validate, call the db/service layer, wrap the result.

pub mod backup;
pub mod customers;
pub mod expenses;
pub mod export;
pub mod image_cleaner;
pub mod orders;
pub mod products;
pub mod stats;
pub mod upload_session;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, Request};
use axum::http::HeaderValue;
use axum::routing::get;
use serde_json::{Value, json};
use shared::AppError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub type ApiResult<T> = Result<T, AppError>;

/// JSON extractor reporting malformed bodies as a 400 validation error
/// instead of axum's default 422
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// `{ "message": ... }` body for mutations with nothing else to return
pub(crate) fn message(text: &str) -> axum::Json<Value> {
    axum::Json(json!({ "message": text }))
}

async fn health() -> axum::Json<Value> {
    axum::Json(json!({ "status": "ok" }))
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin = origin
            .parse::<HeaderValue>()
            .unwrap_or_else(|_| HeaderValue::from_static("*"));
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);
    let body_limit = DefaultBodyLimit::max(state.config.max_file_size);

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/products", products::router())
        .nest("/api/customers", customers::router())
        .nest("/api/orders", orders::router())
        .nest("/api/expenses", expenses::router())
        .nest("/api/stats", stats::router())
        .nest("/api/backup", backup::router())
        .nest("/api/upload-session", upload_session::router())
        .nest("/api/image-cleaner", image_cleaner::router())
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
