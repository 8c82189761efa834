//! Error types for the HTTP layer.
//!
//! # Design
//! Every failure — malformed id, undecodable body, missing row, storage
//! fault — is reported the same way: HTTP 400 with a JSON body of
//! `{"error": <message>}`. Clients distinguish causes by the message
//! text, not the status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::store::StoreError;

/// Errors a request handler can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The id path segment did not parse as an integer.
    #[error("Invalid id given: {0}")]
    InvalidId(String),

    /// The JSON request body could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(StoreError::Storage(ref e)) = self {
            tracing::error!(error = %e, "storage failure");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_message_names_the_segment() {
        let err = ApiError::InvalidId("abc".to_string());
        assert_eq!(err.to_string(), "Invalid id given: abc");
    }

    #[test]
    fn not_found_message_passes_through() {
        let err = ApiError::from(StoreError::NotFound { id: 999999 });
        assert_eq!(err.to_string(), "todo with id 999999 not found");
    }
}
