use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The application-wide error taxonomy. Every handler returns
/// `Result<_, ApiError>`; the `IntoResponse` impl maps each variant to its
/// HTTP status and body.
///
/// Two body shapes are produced, mirroring the API contract:
/// - domain errors: `{"message": "..."}`
/// - unclassified failures: `{"error": {"message", "errorCode", "details"}}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing required input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid credential (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Credential valid but login password mismatch (401). Kept distinct from
    /// `Unauthenticated` so callers can tell a bad login from a bad token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but insufficient rights (403).
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent, or an ownership mismatch presented as absence so that
    /// non-owners cannot probe for existence (404).
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique field at registration (409).
    #[error("{0}")]
    Conflict(String),

    /// Unclassified store failure (500).
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Unclassified runtime failure (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Database(e) => {
                // Store failures are logged in full but surfaced generically.
                tracing::error!("database error: {:?}", e);
                json!({
                    "error": {
                        "message": "Internal Server Error",
                        "errorCode": "SERVER_ERROR",
                        "details": null,
                    }
                })
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                json!({
                    "error": {
                        "message": "Internal Server Error",
                        "errorCode": "SERVER_ERROR",
                        "details": null,
                    }
                })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
