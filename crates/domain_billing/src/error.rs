//! Billing domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Bad or negative monetary input; never retried automatically
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown billing or reservation identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concurrent update detected; the caller should retry the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Monetary arithmetic failure (currency mismatch, overflow)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        BillingError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        BillingError::Conflict(message.into())
    }
}
