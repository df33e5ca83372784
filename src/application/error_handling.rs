// src/application/error_handling.rs
//
// Error mapping for callers
//
// - Maps internal errors → caller-facing categories
// - Never exposes SQL or pool internals
// - Logs server-side failures

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for the upstream layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Entity not found (404)
    NotFound,

    /// Name already taken (409)
    AlreadyExists,

    /// Write rejected by a constraint or a dangling reference (409)
    Conflict,

    /// Invalid input (400)
    Validation,

    /// Database/persistence error (500)
    Database,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(err: AppError) -> Self {
        if err.is_constraint_violation() {
            return Self::new(ErrorType::Conflict, "Constraint violated", Some(err.to_string()));
        }

        match err {
            AppError::NotFound(message) => Self::new(ErrorType::NotFound, message, None),

            AppError::AlreadyExists(message) => Self::new(ErrorType::AlreadyExists, message, None),

            AppError::InvalidReference(message) => Self::new(ErrorType::Conflict, message, None),

            AppError::Validation(message) => Self::new(ErrorType::Validation, message, None),

            AppError::Database(db_error) => {
                error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Config(message) => {
                error!("Configuration error: {}", message);
                Self::new(ErrorType::Internal, "Service misconfigured", None)
            }

            AppError::Serialization(serde_error) => {
                error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                error!("IO error: {:?}", io_error);
                Self::new(ErrorType::Internal, "File system operation failed", None)
            }

            AppError::Other(message) => {
                error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from_app_error(err)
    }
}

/// Helper trait to convert Results into serialized ErrorResponses
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| {
            serde_json::to_string(&ErrorResponse::from_app_error(e))
                .unwrap_or_else(|_| "Internal error".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::not_found("Film", "id = 7"));
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Film with id = 7 hasn't been found");
    }

    #[test]
    fn test_already_exists_error() {
        let error = ErrorResponse::from(AppError::already_exists("Genre", "Comedy"));
        assert_eq!(error.error_type, ErrorType::AlreadyExists);
    }

    #[test]
    fn test_invalid_reference_is_conflict() {
        let error = ErrorResponse::from(AppError::InvalidReference("Rating 9".to_string()));
        assert_eq!(error.error_type, ErrorType::Conflict);
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: AppError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();

        assert_eq!(ErrorResponse::from(err).error_type, ErrorType::Conflict);
    }

    #[test]
    fn test_other_database_error_hides_details() {
        let err = AppError::Database(rusqlite::Error::InvalidQuery);
        let error = ErrorResponse::from(err);

        assert_eq!(error.error_type, ErrorType::Database);
        assert_eq!(error.message, "Database operation failed");
    }

    #[test]
    fn test_validation_error() {
        let error = ErrorResponse::validation("Invalid input");
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Invalid input");
    }

    #[test]
    fn test_to_error_response_serializes() {
        let result: Result<(), AppError> = Err(AppError::not_found("User", "id = 1"));
        let json = result.to_error_response().unwrap_err();

        assert!(json.contains("not_found"));
        assert!(json.contains("User with id = 1"));
    }
}
