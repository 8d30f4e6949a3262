// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Application-wide error type, with `thiserror` for ergonomics.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Supplier not found")]
    SupplierNotFound,

    #[error("Trip not found")]
    TripNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("E-mail already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Record owned by another user")]
    PermissionDenied,

    // Database errors (sqlx, hosted-store path)
    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    // Local snapshot file errors (offline/demo store)
    #[error("Snapshot storage error: {0}")]
    StorageError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Document rendering failed: {0}")]
    DocumentError(String),

    // Catch-all for anything unexpected; `anyhow::Error` keeps the context.
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Return every validation detail, keyed by field.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::SupplierNotFound => (StatusCode::NOT_FOUND, "Supplier not found."),
            AppError::TripNotFound => (StatusCode::NOT_FOUND, "Trip not found."),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found."),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "This e-mail is already in use."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid e-mail or password."),
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Missing or invalid authentication token.")
            }
            AppError::PermissionDenied => {
                (StatusCode::FORBIDDEN, "This record belongs to another user.")
            }
            // A sqlx RowNotFound bubbling up means the requested id is absent.
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Record not found.")
            }

            // Everything else (DatabaseError, StorageError, ...) becomes a 500.
            // `tracing` logs the detailed message that `thiserror` built.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        // Standard shape for errors that carry a single message.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
