use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the carrier integration.
///
/// "Expected absence" outcomes (unknown city, no quote available) are not
/// errors; those surface as `None` from the functions that produce them.
#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("carrier login failed (status {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("resolution failed: {0}")]
    Resolution(String),

    #[error("delivery creation rejected: {message}")]
    Creation { message: String, body: String },

    #[error("delivery cancellation rejected: {message}")]
    Cancellation { message: String, body: String },

    #[error("tracking lookup failed (status {status}): {body}")]
    Tracking { status: u16, body: String },

    #[error("carrier transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for CarrierError {
    fn from(err: reqwest::Error) -> Self {
        CarrierError::Transport(err.to_string())
    }
}

/// Errors surfaced by the gateway's own REST layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Carrier(err) => (carrier_status(err), err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

fn carrier_status(err: &CarrierError) -> StatusCode {
    match err {
        CarrierError::Resolution(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CarrierError::Creation { .. } | CarrierError::Cancellation { .. } => {
            StatusCode::CONFLICT
        }
        CarrierError::Tracking { .. } => StatusCode::NOT_FOUND,
        CarrierError::Auth { .. } | CarrierError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}
