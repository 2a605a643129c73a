//! # Error Types
//!
//! Domain-specific error types for fixit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fixit-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input rejected before any write                │
//! │                                                                         │
//! │  fixit-core::access::AccessDenied - role lacks the capability          │
//! │  fixit-core::vault::VaultError    - key/cipher problems (never fatal)  │
//! │                                                                         │
//! │  fixit-db errors                                                       │
//! │  └── DbError          - Store failures                                 │
//! │                                                                         │
//! │  fixit-service errors                                                  │
//! │  └── ServiceError     - What the HTTP collaborator sees (serialized)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError                      │
//! │                          DbError   → ServiceError                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::access::AccessDenied;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The caller's role does not permit the operation.
    ///
    /// ## User Workflow
    /// ```text
    /// STAFF clicks "Delete order"
    ///      │
    ///      ▼
    /// authorize(Some(Staff), DeleteOrder)
    ///      │
    ///      ▼
    /// AccessDenied { role: Some(Staff), operation: DeleteOrder }
    ///      │
    ///      ▼
    /// UI shows: "STAFF may not delete orders"
    /// ```
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// A ledger total does not fit in an i64 of paise.
    #[error("{0} is too large to total")]
    AmountOverflow(&'static str),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything touches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Amount may not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (non-digit PIN, bad email, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set (unknown status, role, mode).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. staff email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The request is well-formed but refers to an impossible action.
    #[error("{0}")]
    Rejected(String),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Operation;
    use crate::types::Role;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("customer_name").to_string(),
            "customer_name is required"
        );

        let err = ValidationError::Negative {
            field: "advance".to_string(),
        };
        assert_eq!(err.to_string(), "advance must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("problem").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_access_denied_converts_to_core_error() {
        let denied = AccessDenied {
            role: Some(Role::Staff),
            operation: Operation::DeleteOrder,
        };
        let core_err: CoreError = denied.into();
        assert!(matches!(core_err, CoreError::AccessDenied(_)));
    }
}
