//! # Service Error Type
//!
//! The single error type every [`ShopService`](crate::ShopService)
//! operation returns.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the FixIt Shop                         │
//! │                                                                         │
//! │  HTTP collaborator              Rust core                               │
//! │  ─────────────────              ─────────                               │
//! │                                                                         │
//! │  POST /orders/:id/collect                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  ShopService::collect_balance → Result<T, ServiceError>          │  │
//! │  │         │                                                        │  │
//! │  │  AccessDenied? ──────────────────────────── UNAUTHORIZED ──────►│  │
//! │  │  ValidationError? ───────────────────────── VALIDATION_ERROR ──►│  │
//! │  │  DbError::NotFound? ─────────────────────── NOT_FOUND ─────────►│  │
//! │  │  Any other DbError? ── logged with error! ─ DATABASE_ERROR ────►│  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "RepairOrder not found: 8c1f…" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store details never reach the caller; they go to the log.

use serde::Serialize;
use ts_rs::TS;

use crate::config::ConfigError;
use fixit_core::{AccessDenied, CoreError, ValidationError};
use fixit_db::DbError;

/// Error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "customer_name is required"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Caller's role may not perform the operation (403)
    Unauthorized,

    /// Store operation failed (500)
    DatabaseError,

    /// Configuration or other internal failure (500)
    Internal,
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ServiceError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ServiceError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ServiceError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Decode(e) => {
                tracing::error!("Stored value could not be decoded: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::AccessDenied(e) => e.into(),
            CoreError::AmountOverflow(what) => {
                tracing::error!("Ledger total out of range: {}", what);
                ServiceError::internal("Stored amounts are too large to total")
            }
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(err: AccessDenied) -> Self {
        tracing::warn!(role = ?err.role, operation = ?err.operation, "Access denied");
        ServiceError::new(ErrorCode::Unauthorized, err.to_string())
    }
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ServiceError::internal(err.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

#[cfg(test)]
mod tests {
    use super::*;
    use fixit_core::{authorize, Operation, Role};

    #[test]
    fn test_store_details_are_hidden() {
        let err: ServiceError = DbError::QueryFailed("no such table: sales".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("sales"));
    }

    #[test]
    fn test_not_found_and_duplicate() {
        let err: ServiceError = DbError::not_found("Sale", "s-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Sale not found: s-1");

        let err: ServiceError = DbError::duplicate("email", "a@b.in").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_access_denied_is_unauthorized() {
        let denied = authorize(Some(Role::Staff), Operation::DeleteOrder).unwrap_err();
        let err: ServiceError = CoreError::from(denied).into();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.message, "STAFF may not delete orders");
    }

    #[test]
    fn test_serialized_shape() {
        let err = ServiceError::validation("problem is required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "problem is required");
    }
}
