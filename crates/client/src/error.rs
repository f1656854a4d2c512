use common::ValidationErrors;
use serde_json::Value;
use thiserror::Error;

/// Errors from the HTTP API client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a failure envelope.
    #[error("{message} (HTTP {status})")]
    Api {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("response envelope carried no data")]
    MissingData,
}

impl ClientError {
    /// HTTP status of an API failure, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            ClientError::MissingData => None,
        }
    }
}

/// Errors from cart persistence and checkout.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cart is empty")]
    EmptyCart,

    /// Checkout details fail the same rules the server applies.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}
