//! Unified application error model and HTTP mapping.
//! One enum covers every failure a request path can hit. Client-visible
//! bodies are fixed strings so internal detail never reaches the wire:
//! store failures are logged server-side and surface as a generic 500,
//! and the three token failure kinds collapse to a single 403 body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Registration hit the username uniqueness constraint.
    DuplicateUsername,
    /// Unknown username or wrong password. One kind on purpose, so clients
    /// cannot enumerate usernames.
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    ExpiredToken,
    /// Delete matched nothing: the note is absent or belongs to someone
    /// else. Never reveals which.
    NotFoundOrNotOwned,
    /// Backend failure. `detail` is for logs only.
    Store { detail: String },
}

impl AppError {
    pub fn store<E: Display>(err: E) -> Self {
        AppError::Store { detail: err.to_string() }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            AppError::DuplicateUsername => "duplicate_username",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::MissingToken => "missing_token",
            AppError::InvalidToken => "invalid_token",
            AppError::ExpiredToken => "expired_token",
            AppError::NotFoundOrNotOwned => "not_found",
            AppError::Store { .. } => "store_error",
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::ExpiredToken => StatusCode::FORBIDDEN,
            AppError::NotFoundOrNotOwned => StatusCode::NOT_FOUND,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message a client is allowed to see. Missing, invalid and expired
    /// tokens share one body; store detail is replaced by a generic line.
    pub fn client_message(&self) -> &'static str {
        match self {
            AppError::DuplicateUsername => "User already exists",
            AppError::InvalidCredentials => "Invalid credentials",
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::ExpiredToken => "Invalid token",
            AppError::NotFoundOrNotOwned => "Note not found or unauthorized",
            AppError::Store { .. } => "Internal server error",
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Store { detail } => write!(f, "{}: {}", self.code_str(), detail),
            _ => write!(f, "{}", self.code_str()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::store(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Store { detail } = &self {
            tracing::error!(code = self.code_str(), detail = %detail, "request failed on store");
        }
        (self.http_status(), Json(json!({ "message": self.client_message() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
