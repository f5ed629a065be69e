//! Error types for the loan document server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared_pdf::DecodeError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Missing document: {0}")]
    MissingDocument(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not read {part}: {source}")]
    Decode {
        part: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("Decoding timeout after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::MissingDocument(_) | ServerError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
            }
            ServerError::Decode { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNSUPPORTED_DOCUMENT")
            }
            ServerError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT"),
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
