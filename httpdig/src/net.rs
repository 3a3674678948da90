//! Network-related code, i.e. actually sending queries and receiving answers.

use std::io::Read;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ResolutionError;

/// Largest response body that is read; resolver replies are a few kilobytes at most.
pub const MAX_BODY_LEN: u64 = 1 << 20;

/// What the resolver sent back, before any decoding.
#[derive(Clone, Debug)]
pub struct HttpReply {
    /// The HTTP status code.
    pub status: u16,
    /// The raw response body.
    pub body: Vec<u8>,
    /// Time between sending the request and receiving the response headers.
    pub elapsed: Duration,
}

impl HttpReply {
    /// Whether the HTTP status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Creates the HTTP agent used for all queries of one resolver.
///
/// `timeout` bounds the whole request, from connecting to reading the last byte.
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("httpdig/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Sends a single GET request with the given query string parameters to `endpoint`.
///
/// A non-2xx status is not an error here: resolvers put diagnostics into the body of such
/// responses, so the caller gets to look at it first. Bodies longer than [`MAX_BODY_LEN`] are
/// rejected without reading the rest.
pub fn send_query_http(
    agent: &ureq::Agent,
    endpoint: &str,
    params: &[(&str, String)],
) -> Result<HttpReply, ResolutionError> {
    let mut request = agent
        .get(endpoint)
        .set("Accept", "application/dns-json, application/json");
    for (key, value) in params {
        request = request.query(key, value);
    }

    let before = Instant::now();
    let response = match request.call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            warn!(endpoint, status, "resolver replied with a non-success HTTP status");
            response
        }
        Err(ureq::Error::Transport(transport)) => {
            debug!(endpoint, error = %transport, "HTTP(S) request failed");
            return Err(transport.into());
        }
    };
    let elapsed = before.elapsed();

    let status = response.status();
    let mut body = Vec::new();
    response
        .into_reader()
        .take(MAX_BODY_LEN + 1)
        .read_to_end(&mut body)?;
    if body.len() as u64 > MAX_BODY_LEN {
        warn!(endpoint, status, "resolver reply exceeds {} bytes", MAX_BODY_LEN);
        return Err(ResolutionError::BodyTooLarge(MAX_BODY_LEN));
    }

    debug!(
        endpoint,
        status,
        bytes = body.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "received resolver reply"
    );

    Ok(HttpReply {
        status,
        body,
        elapsed,
    })
}
