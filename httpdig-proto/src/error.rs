//! Custom error type definitions.

use thiserror::Error;

/// Errors that may arise while decoding a resolver response.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed resolver response: {0}.")]
    Json(#[from] serde_json::Error),
}
