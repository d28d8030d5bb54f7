//! Error types for the Order actor.

use crate::journal::JournalError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The order data provided is invalid. Nothing was written.
    #[error("Order validation error: {0}")]
    Validation(String),

    /// The requested order does not exist (never created, or deleted).
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The store could not be reached or could not persist the change.
    #[error("Order store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<JournalError> for OrderError {
    fn from(e: JournalError) -> Self {
        OrderError::StoreUnavailable(e.to_string())
    }
}
