// src/api.rs
//! HTTP boundary: request decoding, the aggregation call, and the single
//! top-level error path.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::request::FetchRequest;
use crate::ingest::{Aggregator, FetchResponse};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news/fetch", post(fetch_news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Anything that escapes request handling. Rendered as a generic 500.
#[derive(Debug)]
pub struct ApiError {
    message: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        Self {
            message: rej.body_text(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            message: format!("{e:#}"),
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "Internal server error",
            message: self.message,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn fetch_news(
    State(state): State<AppState>,
    payload: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<FetchResponse>, ApiError> {
    let Json(req) = payload.map_err(|rej| {
        tracing::warn!(error = %rej.body_text(), "rejected news request");
        ApiError::from(rej)
    })?;
    Ok(Json(state.aggregator.fetch_news(&req).await))
}
