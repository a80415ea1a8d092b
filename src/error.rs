//! Unified error handling.
//!
//! Domain-specific error enums feed one `ApiError`, which maps every variant
//! to an HTTP status and a JSON body at the actix boundary. Store failures
//! are logged with detail but reported to clients generically.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Input validation failures. The field name is the first failing rule's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    NotLowercase(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    OutOfRange(&'static str),
    Mismatch(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::NotLowercase(field) => write!(f, "{} must be lowercase", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::OutOfRange(field) => write!(f, "{} is out of range", field),
            ValidationError::Mismatch(field) => write!(f, "{} does not match the route", field),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication and authorization failures.
#[derive(Debug)]
pub enum AuthError {
    /// Unknown username or wrong password; one message for both.
    InvalidCredentials,
    MissingToken,
    TokenInvalid,
    TokenExpired,
    /// A handler asked for claims the gate never attached.
    MissingClaims,
    Forbidden,
    Banned,
    Signing(String),
    Entropy,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "username or password invalid"),
            AuthError::MissingToken => write!(f, "missing authorization header"),
            AuthError::TokenInvalid => write!(f, "invalid token"),
            AuthError::TokenExpired => write!(f, "token expired"),
            AuthError::MissingClaims => write!(f, "no authenticated identity on request"),
            AuthError::Forbidden => write!(f, "insufficient access level"),
            AuthError::Banned => write!(f, "account is banned"),
            AuthError::Signing(msg) => write!(f, "token signing failed: {}", msg),
            AuthError::Entropy => write!(f, "entropy source unavailable"),
        }
    }
}

impl StdError for AuthError {}

/// Unexpected failures from the credential store.
#[derive(Debug)]
pub enum StoreError {
    Query(String),
    Integrity(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Query(msg) => write!(f, "query failed: {}", msg),
            StoreError::Integrity(msg) => write!(f, "corrupt record: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Central error type all handlers return.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Conflict(&'static str),
    NotFound(String),
    Auth(AuthError),
    Store(StoreError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Conflict(msg) => write!(f, "{}", msg),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl StdError for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("record not found".to_string()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("resource already exists")
            }
            other => ApiError::Store(StoreError::Query(other.to_string())),
        }
    }
}

/// JSON body returned for every error response.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Auth(AuthError::InvalidCredentials) => "INVALID_CREDENTIALS",
            ApiError::Auth(AuthError::Forbidden) | ApiError::Auth(AuthError::Banned) => "FORBIDDEN",
            ApiError::Auth(AuthError::Signing(_)) | ApiError::Auth(AuthError::Entropy) => {
                "INTERNAL_ERROR"
            }
            ApiError::Auth(_) => "UNAUTHORIZED",
            ApiError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Message sent to the client. Store and signing detail stays in the logs.
    fn client_message(&self) -> String {
        match self {
            ApiError::Store(_)
            | ApiError::Auth(AuthError::Signing(_))
            | ApiError::Auth(AuthError::Entropy) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn log(&self, request_id: &str) {
        match self {
            ApiError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "store error");
            }
            ApiError::Auth(AuthError::Signing(msg)) => {
                tracing::error!(request_id = request_id, error = %msg, "token signing error");
            }
            ApiError::Auth(AuthError::Entropy) => {
                tracing::error!(request_id = request_id, "entropy source unavailable");
            }
            other => {
                tracing::warn!(request_id = request_id, error = %other, "request rejected");
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            // Existing bot clients expect 400 for duplicates, not 409.
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(e) => match e {
                AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
                AuthError::MissingToken
                | AuthError::TokenInvalid
                | AuthError::TokenExpired
                | AuthError::MissingClaims => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden | AuthError::Banned => StatusCode::FORBIDDEN,
                AuthError::Signing(_) | AuthError::Entropy => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log(&request_id);

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            code: self.code(),
            message: self.client_message(),
        })
    }
}

/// Per-operation logging context carried through a handler.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: &'static str,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_names_the_field() {
        assert_eq!(
            ValidationError::EmptyField("username").to_string(),
            "username is empty"
        );
        assert_eq!(
            ValidationError::TooShort("username", 3).to_string(),
            "username is too short (minimum 3 characters)"
        );
    }

    #[test]
    fn conflict_maps_to_400() {
        assert_eq!(
            ApiError::Conflict("username already taken").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        assert_eq!(
            ApiError::Auth(AuthError::InvalidCredentials).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Auth(AuthError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Auth(AuthError::Forbidden).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Auth(AuthError::Banned).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn store_errors_hide_detail_from_clients() {
        let err = ApiError::Store(StoreError::Query("connection refused".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "internal server error");
    }

    #[test]
    fn row_not_found_converts_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn validation_error_converts_via_from() {
        let err: ApiError = ValidationError::InvalidFormat("email").into();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
