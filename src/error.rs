//!
//! # Error Handling
//!
//! This module defines the error types used throughout the service:
//!
//! - `AppError` for general request handling (session tokens, hashing, extractors).
//! - `AuthError`, the tagged outcome of a rejected login attempt. Every variant is
//!   terminal and is rendered to the client with the same generic message.
//! - `DataAccessError` for failures of the user store.
//! - `ConfigError` for invalid or missing startup configuration.
//!
//! `AppError` and `AuthError` implement `actix_web::error::ResponseError` so handlers
//! can return them directly and rely on the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message shown to clients for every rejected login, whatever the reason.
pub const GENERIC_REJECTION: &str = "Invalid credentials";

/// Represents the general errors that can occur while serving a request.
#[derive(Debug)]
pub enum AppError {
    /// Authentication is required but missing or invalid (HTTP 401).
    Unauthorized(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            AppError::Unauthorized(msg) => msg.as_str(),
            // Internal details stay in the logs.
            AppError::InternalServerError(_) => "Internal server error",
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": msg }))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// A failure of the user store: unreachable, timed out, or returned a row that
/// could not be decoded.
#[derive(Debug)]
pub struct DataAccessError {
    message: String,
}

impl DataAccessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DataAccessError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Failed to fetch user: {}", self.message)
    }
}

impl std::error::Error for DataAccessError {}

impl From<sqlx::Error> for DataAccessError {
    fn from(error: sqlx::Error) -> Self {
        DataAccessError::new(error.to_string())
    }
}

/// Terminal outcome of a rejected login attempt.
///
/// `Display` keeps the precise reason for server logs. Clients only ever see
/// [`GENERIC_REJECTION`], so an unknown email and a wrong password produce the
/// same response.
#[derive(Debug)]
pub enum AuthError {
    /// The submission failed shape validation. Lists the offending fields.
    InvalidInput { fields: Vec<String> },
    /// The user store could not answer.
    DataAccess(DataAccessError),
    /// No user is registered with the submitted email.
    UserNotFound,
    /// The user exists but the password does not match the stored hash.
    PasswordMismatch,
    /// Any other server-side failure (malformed stored hash, session signing).
    Internal(String),
}

impl AuthError {
    /// Stable, machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidInput { .. } => "invalid_input",
            AuthError::DataAccess(_) => "data_access",
            AuthError::UserNotFound => "user_not_found",
            AuthError::PasswordMismatch => "password_mismatch",
            AuthError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidInput { fields } => {
                write!(f, "Invalid credentials: {}", fields.join(", "))
            }
            AuthError::DataAccess(err) => write!(f, "{}", err),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::PasswordMismatch => write!(f, "Invalid password"),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::UserNotFound | AuthError::PasswordMismatch => StatusCode::UNAUTHORIZED,
            AuthError::DataAccess(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AuthError::InvalidInput { fields } => json!({
                "error": GENERIC_REJECTION,
                "fields": fields,
            }),
            _ => json!({ "error": GENERIC_REJECTION }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        AuthError::InvalidInput { fields }
    }
}

impl From<DataAccessError> for AuthError {
    fn from(error: DataAccessError) -> Self {
        AuthError::DataAccess(error)
    }
}

/// Startup configuration problems.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    Missing(&'static str),
    /// A variable is set but its value is unusable.
    Invalid { name: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid { name, reason } => write!(f, "{} is invalid: {}", name, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::Unauthorized("x".into()).error_response().status(), 401);
        assert_eq!(AppError::InternalServerError("x".into()).error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_internal_error_details_are_hidden() {
        let response =
            AppError::InternalServerError("Failed to verify password: invalid cost".into())
                .error_response();
        let body = body_of(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[actix_rt::test]
    async fn test_not_found_and_mismatch_look_identical() {
        let not_found = AuthError::UserNotFound.error_response();
        let mismatch = AuthError::PasswordMismatch.error_response();
        assert_eq!(not_found.status(), mismatch.status());
        assert_eq!(body_of(not_found).await, body_of(mismatch).await);
    }

    #[actix_rt::test]
    async fn test_invalid_input_lists_fields_with_generic_message() {
        let err = AuthError::InvalidInput {
            fields: vec!["email".into(), "password".into()],
        };
        let response = err.error_response();
        assert_eq!(response.status(), 422);
        let body = body_of(response).await;
        assert_eq!(body["error"], GENERIC_REJECTION);
        assert_eq!(body["fields"], json!(["email", "password"]));
    }

    #[actix_rt::test]
    async fn test_data_access_is_reported_generically() {
        let err = AuthError::DataAccess(DataAccessError::new("pool timed out"));
        assert_eq!(err.to_string(), "Failed to fetch user: pool timed out");
        let response = err.error_response();
        assert_eq!(response.status(), 500);
        assert_eq!(body_of(response).await["error"], GENERIC_REJECTION);
    }

    #[test]
    fn test_internal_reasons_stay_distinct() {
        assert_eq!(AuthError::UserNotFound.to_string(), "User not found");
        assert_eq!(AuthError::PasswordMismatch.to_string(), "Invalid password");
        assert_eq!(AuthError::UserNotFound.kind(), "user_not_found");
    }
}
