//! # Error Types
//!
//! Domain-specific error types for oaxaca-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  oaxaca-core errors (this file)                                        │
//! │  ├── CoreError        - Allocation / lifecycle / order rule failures   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  oaxaca-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Server errors (in app)                                                │
//! │  └── ApiError         - What the HTTP client sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Every table on the floor is taken.
    ///
    /// Recoverable: the client may retry once a table is cleared.
    #[error("No free table available ({total} tables, all occupied)")]
    NoCapacity { total: i64 },

    /// A concurrent request claimed the table (or waiter) first.
    ///
    /// ## When This Occurs
    /// - Two registrations race for the last free tables and the retry
    ///   budget runs out
    /// - The customer is already seated at another table
    #[error("Conflict on table {table_number}: {reason}")]
    Conflict { table_number: i64, reason: String },

    /// A table row holds a combination the engine never produces
    /// (a waiter assigned to a table without a customer).
    #[error("Integrity violation on table {table_number}: {detail}")]
    IntegrityViolation { table_number: i64, detail: String },

    /// The order is not in a status that allows the requested change.
    #[error("Order {order_id} is {from}, cannot become {to}")]
    InvalidOrderTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Whether a client can reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::NoCapacity { .. } | CoreError::Conflict { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., card number, expiry).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NoCapacity { total: 3 };
        assert_eq!(
            err.to_string(),
            "No free table available (3 tables, all occupied)"
        );

        let err = CoreError::InvalidOrderTransition {
            order_id: 9,
            from: OrderStatus::Delivered,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Order 9 is delivered, cannot become cancelled"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(CoreError::NoCapacity { total: 1 }.is_retryable());
        assert!(CoreError::Conflict {
            table_number: 2,
            reason: "claimed".into()
        }
        .is_retryable());
        assert!(!CoreError::IntegrityViolation {
            table_number: 2,
            detail: "x".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
