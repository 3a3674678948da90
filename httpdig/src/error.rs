//! Custom error type definitions.

use httpdig_proto::error::ParseError;
use thiserror::Error;

/// Errors that may arise while querying a resolver.
///
/// A resolver-side failure like `NXDOMAIN` is not one of these; it arrives as a normal
/// [`Response`](httpdig_proto::Response) with a non-zero status.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unable to resolve host.")]
    Resolution(#[from] ResolutionError),

    #[error("Could not decode the resolver's response.")]
    Decode(#[from] ParseError),
}

/// Errors that may arise while talking to the resolver, before there is anything to decode.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("HTTP(S) request unsuccessful.")]
    Transport(#[source] Box<ureq::Transport>),

    #[error("HTTP(S) response code {0} does not indicate success.")]
    HttpStatus(u16),

    #[error("HTTP(S) response is larger than {0} bytes.")]
    BodyTooLarge(u64),

    #[error("Could not read the HTTP(S) response.")]
    Body(#[from] std::io::Error),
}

impl From<ureq::Transport> for ResolutionError {
    fn from(transport: ureq::Transport) -> Self {
        ResolutionError::Transport(Box::new(transport))
    }
}
