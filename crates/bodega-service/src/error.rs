//! # Service Error Types
//!
//! Error types for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bodega POS                             │
//! │                                                                         │
//! │  ValidationError (bodega-core) ──┐                                      │
//! │                                  ├──► ServiceError ──► host app         │
//! │  DbError (bodega-db) ────────────┘         │                            │
//! │        │                                   │                            │
//! │        │  NotFound is promoted to a        │  Display is safe to show;  │
//! │        │  typed ServiceError::NotFound;    │  store details live in     │
//! │        │  everything else is wrapped       │  the log, not the message  │
//! │        │  and logged at the boundary       │                            │
//! │        ▼                                   ▼                            │
//! │  Checkout has its own error: the submission sequence has two store      │
//! │  failure points that callers treat differently (CheckoutError), plus    │
//! │  per-item stock results inside a *successful* outcome.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bodega_core::ValidationError;
use bodega_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by catalog, user, and dashboard operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No authenticated user was supplied.
    #[error("No authenticated user")]
    Unauthenticated,

    /// The caller is authenticated but lacks permission for the operation.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Input validation failed. The message is user-facing as-is.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The store failed. Details are logged at the boundary; the Display
    /// text stays generic.
    #[error("Storage operation failed")]
    Store(#[source] DbError),
}

impl ServiceError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Store NotFound becomes the typed service NotFound; everything else is
/// carried as a Store failure.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Store(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Errors from the checkout submission sequence.
///
/// These mark *where* the sequence stopped: before any write
/// (Unauthenticated, EmptyCart), at the transaction insert, or at the item
/// inserts (after which the transaction has been compensated away).
/// Per-item stock problems are not errors; they ride inside a successful
/// [`crate::CheckoutOutcome`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No authenticated user was supplied.
    #[error("No authenticated user")]
    Unauthenticated,

    /// The cart snapshot had no items; nothing was written.
    #[error("Cart is empty")]
    EmptyCart,

    /// The transaction row could not be created; nothing was written.
    #[error("Could not record the sale")]
    TransactionCreateFailed(#[source] DbError),

    /// An item row could not be created. The transaction and any item rows
    /// already written have been deleted again.
    #[error("Could not record the sale items")]
    ItemsCreateFailed(#[source] DbError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_promotes_to_typed_not_found() {
        let err: ServiceError = DbError::not_found("Product", "p-1").into();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert_eq!(err.to_string(), "Product not found: p-1");
    }

    #[test]
    fn test_other_db_errors_stay_generic() {
        let err: ServiceError = DbError::QueryFailed("syntax error".to_string()).into();
        assert!(matches!(err, ServiceError::Store(_)));
        // The raw store detail never leaks into the Display text
        assert_eq!(err.to_string(), "Storage operation failed");
    }

    #[test]
    fn test_validation_display_passes_through() {
        let err: ServiceError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "name is required");
    }
}
