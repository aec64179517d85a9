use thiserror::Error;

pub type Result<T> = std::result::Result<T, BraintreeError>;

#[derive(Debug, Error)]
pub enum BraintreeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown environment: {0}")]
    Environment(String),

    /// The gateway refused the request on its merits (bad nonce, processor
    /// decline, gateway rejection). `payload` is the raw gateway response.
    #[error("Transaction declined: {message}")]
    Declined {
        message: String,
        payload: serde_json::Value,
    },
}

impl From<reqwest::Error> for BraintreeError {
    fn from(err: reqwest::Error) -> Self {
        BraintreeError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for BraintreeError {
    fn from(err: serde_json::Error) -> Self {
        BraintreeError::Parse(err.to_string())
    }
}
