//! HTTP handlers.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use newsdesk_avatar::{AvatarError, StreamingTokenIssuer};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub issuer: StreamingTokenIssuer,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("upstream error: {0}")]
    BadGateway(String),
}

impl From<AvatarError> for ApiError {
    fn from(e: AvatarError) -> Self {
        match e {
            AvatarError::Config(msg) => ApiError::Unavailable(msg),
            AvatarError::Vendor { status, .. } => {
                ApiError::BadGateway(format!("vendor returned status {status}"))
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `POST /api/get-access-token`.
///
/// Exchanges the vendor API key for a short-lived session token and returns
/// it as plain text.
pub async fn get_access_token(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let token = state.issuer.create_token().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to create access token");
        ApiError::from(e)
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        token,
    )
        .into_response())
}
