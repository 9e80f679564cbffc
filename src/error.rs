//! Error types for the upload registry
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Registry Error Enum ==
/// Unified error type for the signature cache, upload registry and HTTP layer.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Malformed or missing input, rejected before any store access
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key-value store unreachable, timed out, or returned an error
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// No API secret configured for signing
    #[error("Signing secret is not configured")]
    MissingSecret,

    /// The signing computation failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Internal(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegistryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RegistryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegistryError::MissingSecret
            | RegistryError::Signing(_)
            | RegistryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the upload registry.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (RegistryError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                RegistryError::StoreUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RegistryError::MissingSecret, StatusCode::INTERNAL_SERVER_ERROR),
            (RegistryError::Signing("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
