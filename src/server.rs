//! HTTP surface: one `POST /api/generate` endpoint.
//!
//! The handler is the error boundary: every failure (bad JSON, validation,
//! rate limiting, upstream errors) is converted to a JSON error shape
//! (`{"error", "detail"?}`) with the matching status code. Nothing is
//! allowed to crash the process.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, warn};

use crate::dispatch::Dispatcher;
use crate::limiter::{client_key, RateLimiter};
use crate::types::{ApiError, RawRequest};

/// Shared application state handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Per-client admission control.
    pub limiter: Arc<RateLimiter>,
    /// Pipeline orchestrator.
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/generate",
            post(generate).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// The single generation endpoint.
async fn generate(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<RawRequest>, JsonRejection>,
) -> Response {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let key = client_key(forwarded, Some(&peer.to_string()));

    if !state.limiter.allow(&key) {
        warn!(client = %key, "rate limited");
        return ApiError::RateLimited.into_response();
    }

    let raw = match body {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            return ApiError::BadRequest(format!("invalid request body: {rejection}"))
                .into_response();
        }
    };

    let request = match raw.into_request() {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    match state.dispatcher.dispatch(request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Any non-POST method on the endpoint.
async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "use POST" })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": self.to_string() }),
            ),
            ApiError::MissingCredential => {
                error!("request rejected: no generation credential configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
            ApiError::Upstream { detail } => {
                warn!(detail = %detail, "upstream backend error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string(), "detail": detail }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
