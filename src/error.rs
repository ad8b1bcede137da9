//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` used throughout the application.
//! Every handler, service and extractor returns it, and it is only turned into an
//! HTTP status at the boundary through `actix_web::error::ResponseError`.
//!
//! Every error response has the same JSON envelope:
//!
//! ```json
//! { "detail": "Task not found", "error_code": "NOT_FOUND", "status": 404 }
//! ```
//!
//! Internal failures are logged with their detail and answered with an opaque message.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Message returned to the client for every internal failure.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, forged or expired credentials (HTTP 401).
    /// Also used for a failed signin, whatever the cause.
    Unauthorized(String),
    /// Authenticated, but the URL addresses another user's resources (HTTP 403).
    Forbidden(String),
    /// The record does not exist or belongs to someone else (HTTP 404).
    NotFound(String),
    /// A uniqueness rule was violated, e.g. an already registered email (HTTP 422).
    Conflict(String),
    /// Malformed input: bad UUIDs, short passwords, field lengths, unreadable JSON (HTTP 422).
    ValidationError(String),
    /// An unexpected server-side error (HTTP 500). The message is only logged.
    InternalServerError(String),
    /// An error reported by the persistence layer (HTTP 500). The message is only logged.
    DatabaseError(String),
}

impl AppError {
    /// Stable machine-readable code carried in the `error_code` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => "INTERNAL_ERROR",
        }
    }

    /// The message that is safe to show to the client.
    fn public_detail(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => INTERNAL_MESSAGE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::ValidationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }

        let mut builder = HttpResponse::build(status);
        if let AppError::Unauthorized(_) = self {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({
            "detail": self.public_detail(),
            "error_code": self.code(),
            "status": status.as_u16(),
        }))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token encoding only fails on a broken key or header, never on client input.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to generate token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Failed to hash password: {}", error))
    }
}

/// Converts repository outcomes into `AppError`.
///
/// A uniqueness violation can only come from the email constraint, so it becomes the
/// same `Conflict` the signup pre-check produces.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::UniqueViolation(_) => AppError::Conflict("Email already exists".into()),
            StoreError::ForeignKeyViolation(_) => AppError::NotFound("User not found".into()),
            StoreError::Backend(msg) => AppError::DatabaseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_statuses() {
        let cases = [
            (AppError::Unauthorized("Invalid token".into()), 401),
            (AppError::Forbidden("Not yours".into()), 403),
            (AppError::NotFound("Resource not found".into()), 404),
            (AppError::Conflict("Email already exists".into()), 422),
            (AppError::ValidationError("Bad input".into()), 422),
            (AppError::InternalServerError("Server error".into()), 500),
            (AppError::DatabaseError("connection reset".into()), 500),
        ];

        for (error, expected) in cases {
            assert_eq!(error.error_response().status(), expected, "{}", error);
        }
    }

    #[actix_rt::test]
    async fn test_internal_detail_is_not_leaked() {
        let error = AppError::DatabaseError("relation \"tasks\" does not exist".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["detail"], "Internal server error");
        assert_eq!(json["error_code"], "INTERNAL_ERROR");
        assert_eq!(json["status"], 500);
    }

    #[actix_rt::test]
    async fn test_unauthorized_carries_challenge_header() {
        let response = AppError::Unauthorized("Invalid token".into()).error_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error_code"], "UNAUTHORIZED");
        assert_eq!(json["detail"], "Invalid token");
    }

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        let conflict: AppError = StoreError::UniqueViolation("users_email_key".into()).into();
        assert!(matches!(conflict, AppError::Conflict(_)));

        let backend: AppError = StoreError::Backend("timeout".into()).into();
        assert!(matches!(backend, AppError::DatabaseError(_)));
    }
}
