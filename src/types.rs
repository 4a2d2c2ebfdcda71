//! Error types for the union office service

use hyper::StatusCode;
use thiserror::Error;

/// Service-wide error type
#[derive(Error, Debug)]
pub enum OfficeError {
    /// Malformed or missing input
    #[error("validation error: {0}")]
    Validation(String),

    /// No matching entity
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness invariant violation (duplicate tax-year payment,
    /// duplicate type name, duplicate receipt/certificate number)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage unreachable
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Storage call timed out
    #[error("timeout: {0}")]
    Timeout(String),

    /// Storage-layer failure
    #[error("database error: {0}")]
    Database(String),

    /// Unexpected failure; details are logged server-side only
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, OfficeError>;

impl OfficeError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OfficeError::Validation(_) => StatusCode::BAD_REQUEST,
            OfficeError::NotFound(_) => StatusCode::NOT_FOUND,
            OfficeError::Conflict(_) => StatusCode::CONFLICT,
            OfficeError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            OfficeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            OfficeError::Database(_) | OfficeError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code for the error response body
    pub fn code(&self) -> &'static str {
        match self {
            OfficeError::Validation(_) => "VALIDATION_ERROR",
            OfficeError::NotFound(_) => "NOT_FOUND",
            OfficeError::Conflict(_) => "CONFLICT",
            OfficeError::Unavailable(_) => "UNAVAILABLE",
            OfficeError::Timeout(_) => "TIMEOUT",
            OfficeError::Database(_) => "DB_ERROR",
            OfficeError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Database and internal errors carry storage-layer detail that must not
    /// leak; callers get a generic message while the detail is logged.
    pub fn public_message(&self) -> String {
        match self {
            OfficeError::Database(_) => "Database error".to_string(),
            OfficeError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for OfficeError {
    fn from(e: std::io::Error) -> Self {
        OfficeError::Internal(format!("I/O error: {e}"))
    }
}

/// Returns the violated index name if this MongoDB error is a duplicate-key
/// (E11000) write error.
///
/// Uniqueness invariants are enforced by unique indexes rather than
/// check-then-act, so concurrent writers are told apart here: the compound
/// citizen/year index means a real Conflict, while a receipt-number collision
/// is retried with a fresh number.
pub fn duplicate_key_index(err: &mongodb::error::Error) -> Option<String> {
    use mongodb::error::{ErrorKind, WriteFailure};

    let write_error = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000 => we,
        _ => return None,
    };

    // Message shape: "E11000 duplicate key error collection: db.coll
    // index: <name> dup key: ..."
    let msg = &write_error.message;
    let name = msg
        .split("index:")
        .nth(1)
        .map(|rest| rest.trim_start())
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("")
        .to_string();

    Some(name)
}

impl From<mongodb::error::Error> for OfficeError {
    fn from(e: mongodb::error::Error) -> Self {
        if let Some(index) = duplicate_key_index(&e) {
            return OfficeError::Conflict(format!("duplicate key on index {index}"));
        }
        OfficeError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            OfficeError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OfficeError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            OfficeError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            OfficeError::Unavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            OfficeError::Timeout("x".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            OfficeError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = OfficeError::Database("connection string mongodb://secret@host".into());
        assert_eq!(err.public_message(), "Database error");

        let err = OfficeError::Internal("stack trace here".into());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_conflict_detail_exposed() {
        let err = OfficeError::Conflict("payment already recorded for 2024-2025".into());
        assert!(err.public_message().contains("2024-2025"));
    }
}
