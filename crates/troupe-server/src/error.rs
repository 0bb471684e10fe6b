//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use troupe_core::TroupeError;

/// An error ready to leave the HTTP surface as a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// A plain 404 with a message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<TroupeError> for ApiError {
    fn from(err: TroupeError) -> Self {
        let status = match &err {
            TroupeError::PersonaNotFound { .. } | TroupeError::SessionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            TroupeError::BindingNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TroupeError::Config(_) | TroupeError::Serialization { .. } => StatusCode::BAD_REQUEST,
            TroupeError::Registry { .. } | TroupeError::Generation { .. } => StatusCode::BAD_GATEWAY,
            TroupeError::Cancelled => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
