//! `httpdig` looks up DNS records through a DNS-over-HTTPS resolver speaking the JSON API, by
//! default Google's public resolver at `https://dns.google.com/resolve`.
//!
//! Each lookup is a single HTTPS GET whose JSON reply is decoded into a
//! [`Response`](httpdig_proto::Response). By default queries carry the anonymous EDNS client subnet
//! `0.0.0.0/0` and are padded so that the request size does not give away the length of the
//! queried name.
//!
//! ```no_run
//! let response = httpdig::query("google.com", "NS")?;
//! for answer in &response.answers {
//!     println!("{} expires in {} s", answer.data, answer.ttl.as_secs());
//! }
//! # Ok::<(), httpdig::QueryError>(())
//! ```
//!
//! The free functions operate on a process-wide default [`Resolver`]; create your own
//! [`Resolver`] to use another endpoint or keep settings separate.

use httpdig_proto::Response;
use lazy_static::lazy_static;

pub mod error;
pub mod net;
pub mod resolver;
pub mod util;

pub use error::{QueryError, ResolutionError};
pub use resolver::{Reply, Resolver, ResolverConfig};

/// Google's public DNS-over-HTTPS JSON API.
pub const DEFAULT_ENDPOINT: &str = "https://dns.google.com/resolve";

/// The subnet that tells the resolver nothing about the client.
pub const DEFAULT_EDNS_SUBNET: &str = "0.0.0.0/0";

/// Everything that goes into the query string of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryMetadata {
    pub name: String,
    pub qtype: String,
    /// If empty, no `edns_client_subnet` parameter is sent.
    pub edns_subnet: String,
}

lazy_static! {
    static ref DEFAULT_RESOLVER: Resolver = Resolver::new();
}

/// Looks up `record_type` records for `host` using the default resolver.
///
/// See [`Resolver::query()`].
pub fn query(host: &str, record_type: &str) -> Result<Response, QueryError> {
    DEFAULT_RESOLVER.query(host, record_type)
}

/// Sets the EDNS client subnet the default resolver sends with all subsequent queries.
///
/// See [`Resolver::set_edns_subnet()`].
pub fn set_edns_subnet(subnet: impl Into<String>) {
    DEFAULT_RESOLVER.set_edns_subnet(subnet)
}
