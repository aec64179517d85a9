//! Typed errors surfaced by catalog, chatbot and checkout operations.

use thiserror::Error;

/// Errors returned by the domain services. The HTTP layer maps each
/// variant to a status code.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or malformed input, detected before any mutation.
    #[error("{0}")]
    Validation(String),

    /// A brand with the same name already exists.
    #[error("{0}")]
    Duplicate(String),

    /// The addressed (or referenced) record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The gateway refused the payment. `payload` is the gateway's own body.
    #[error("payment declined: {message}")]
    Payment {
        message: String,
        payload: serde_json::Value,
    },

    /// No payment gateway credentials were configured.
    #[error("payments are not configured")]
    PaymentUnavailable,

    /// Store, filesystem or gateway failure.
    #[error(transparent)]
    Dependency(#[from] anyhow::Error),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CatalogError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CatalogError::NotFound(msg.into())
    }
}
