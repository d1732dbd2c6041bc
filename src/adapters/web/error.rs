//! HTTP error responses for the JSON API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::LongshotError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        // Store failures are reported generically; no internal detail leaks.
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl From<LongshotError> for ApiError {
    fn from(err: LongshotError) -> Self {
        let status = match &err {
            LongshotError::InvalidShares { .. }
            | LongshotError::InvalidSide { .. }
            | LongshotError::UsernameTaken { .. }
            | LongshotError::InsufficientBalance { .. }
            | LongshotError::MarketClosed { .. }
            | LongshotError::AlreadyResolved { .. } => StatusCode::BAD_REQUEST,
            LongshotError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LongshotError::Forbidden => StatusCode::FORBIDDEN,
            LongshotError::MarketNotFound { .. }
            | LongshotError::UserNotFound { .. }
            | LongshotError::UnknownUser { .. } => StatusCode::NOT_FOUND,
            LongshotError::Database { .. }
            | LongshotError::DatabaseQuery { .. }
            | LongshotError::PasswordHash { .. }
            | LongshotError::ConfigParse { .. }
            | LongshotError::ConfigMissing { .. }
            | LongshotError::ConfigInvalid { .. }
            | LongshotError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            Self::internal()
        } else {
            Self::new(status, err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
