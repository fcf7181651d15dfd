//! # Error Types
//!
//! Validation errors for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bodega-core errors (this file)                                         │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  bodega-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  bodega-service errors (separate crate)                                 │
//! │  ├── ServiceError     - Auth/validation/store, what callers see         │
//! │  └── CheckoutError    - Checkout-specific failure stages                │
//! │                                                                         │
//! │  Flow: ValidationError ─┬──► ServiceError ──► caller                    │
//! │              DbError ───┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Core has no operational error type of its own: the cart engine's
//! operations are total (they never fail) and the report math is pure.
//! What can go wrong in core is exactly one thing - bad input - so
//! [`ValidationError`] is the whole story here.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before any store call runs; the Display text is shown to the
/// user as-is and is never logged as a systemic fault.
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

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, bad characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., repeated SKU in one submission).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must be positive");

        let err = ValidationError::Duplicate {
            field: "sku".to_string(),
            value: "COLA-600".to_string(),
        };
        assert_eq!(err.to_string(), "sku 'COLA-600' already exists");
    }
}
