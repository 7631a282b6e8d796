use crate::database::DatabaseError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    Database(DatabaseError),
    NotFound(String),
    InvalidEntry(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {}", err),
            AppError::Database(err) => write!(f, "Storage error: {}", err),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidEntry(msg) => write!(f, "Invalid entry: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => AppError::NotFound("record not found".to_string()),
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            AppError::InvalidEntry(_) => (StatusCode::BAD_REQUEST, "Invalid entry"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_app_error_display() {
        let not_found = AppError::NotFound("no usage record for user_123".to_string());
        assert_eq!(
            not_found.to_string(),
            "Not found: no usage record for user_123"
        );

        let invalid = AppError::InvalidEntry("token sum mismatch".to_string());
        assert_eq!(invalid.to_string(), "Invalid entry: token sum mismatch");

        let internal = AppError::Internal("test message".to_string());
        assert_eq!(internal.to_string(), "Internal error: test message");

        let db_err = AppError::Database(DatabaseError::Database("connection refused".to_string()));
        assert!(db_err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_database_not_found_maps_to_not_found() {
        let app_err: AppError = DatabaseError::NotFound.into();
        assert!(matches!(app_err, AppError::NotFound(_)));
        assert_eq!(
            app_err.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_database_error_maps_to_internal_status() {
        let app_err: AppError = DatabaseError::Database("db down".to_string()).into();
        assert!(matches!(app_err, AppError::Database(_)));
        assert_eq!(
            app_err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_into_response() {
        let cases = [
            (
                AppError::NotFound("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::InvalidEntry("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Unauthorized("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Forbidden("x".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Internal("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
