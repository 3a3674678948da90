//! The resolver client, i.e. everything between a name to look up and a decoded [`Response`].

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use httpdig_proto::Response;
use tracing::debug;

use crate::error::{QueryError, ResolutionError};
use crate::net::{build_agent, send_query_http};
use crate::util::prepare_query;
use crate::{QueryMetadata, DEFAULT_EDNS_SUBNET, DEFAULT_ENDPOINT};

/// Settings a [`Resolver`] is created with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// URL of the resolver's JSON API.
    pub endpoint: String,
    /// Initial EDNS client subnet in CIDR notation, see [`Resolver::set_edns_subnet()`].
    pub edns_subnet: String,
    /// Upper bound for a whole request, including reading the response.
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            edns_subnet: DEFAULT_EDNS_SUBNET.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// A successfully decoded response plus some information about how it was obtained.
#[derive(Clone, Debug)]
pub struct Reply {
    pub response: Response,
    /// Size of the response body.
    pub bytes_recvd: usize,
    /// Round-trip time of the HTTP request.
    pub elapsed: Duration,
}

/// Sends queries to one DNS-over-HTTPS JSON resolver.
///
/// A `Resolver` can be shared between threads. Every query reads the EDNS client subnet once,
/// when it is built, so a concurrent [`Resolver::set_edns_subnet()`] is either fully visible to
/// it or not at all.
#[derive(Debug)]
pub struct Resolver {
    agent: ureq::Agent,
    endpoint: String,
    edns_subnet: ArcSwap<String>,
}

impl Resolver {
    /// Creates a resolver for the default endpoint with the anonymous subnet `0.0.0.0/0`.
    pub fn new() -> Self {
        Self::from_config(ResolverConfig::default())
    }

    pub fn from_config(config: ResolverConfig) -> Self {
        Self {
            agent: build_agent(config.timeout),
            endpoint: config.endpoint,
            edns_subnet: ArcSwap::from_pointee(config.edns_subnet),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The EDNS client subnet the next query will be sent with.
    pub fn edns_subnet(&self) -> Arc<String> {
        self.edns_subnet.load_full()
    }

    /// Sets the EDNS client subnet for all subsequent queries.
    ///
    /// The default of `0.0.0.0/0` gives the resolver no hint about where the query came from.
    /// An empty string omits the parameter, which permits the resolver to use the client's public
    /// IP address (with the last portion chopped off) for a geolocation-optimized answer. Any
    /// other value must be in slashed-subnet format, such as `"127.1.2.3/24"`; it is sent
    /// verbatim, and if the resolver rejects it, that shows up in the response's status and
    /// comment.
    pub fn set_edns_subnet(&self, subnet: impl Into<String>) {
        self.edns_subnet.store(Arc::new(subnet.into()));
    }

    /// Looks up records of type `record_type` (e.g. `"A"`, `"NS"`, `"MX"`) for `host`.
    ///
    /// Neither argument is validated; the resolver reports invalid values through the status of
    /// the returned [`Response`].
    pub fn query(&self, host: &str, record_type: &str) -> Result<Response, QueryError> {
        self.send(host, record_type).map(|reply| reply.response)
    }

    /// Like [`Self::query()`], but also returns the size and round-trip time of the reply.
    pub fn send(&self, host: &str, record_type: &str) -> Result<Reply, QueryError> {
        let metadata = QueryMetadata {
            name: host.into(),
            qtype: record_type.into(),
            edns_subnet: self.edns_subnet.load_full().to_string(),
        };
        let params = prepare_query(&metadata);
        debug!(
            name = %metadata.name,
            qtype = %metadata.qtype,
            endpoint = %self.endpoint,
            edns_subnet = %metadata.edns_subnet,
            "sending query"
        );

        let reply = send_query_http(&self.agent, &self.endpoint, &params)?;
        let response = if reply.is_success() {
            Response::parse(&reply.body)?
        } else {
            match Response::parse(&reply.body) {
                Ok(response) if has_status(&reply.body) => response,
                // an error page from some proxy in between, not something the resolver said
                _ => return Err(ResolutionError::HttpStatus(reply.status).into()),
            }
        };

        Ok(Reply {
            response,
            bytes_recvd: reply.body.len(),
            elapsed: reply.elapsed,
        })
    }
}

/// Whether `body` is a JSON object carrying a `Status`, i.e. an actual resolver reply.
fn has_status(body: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .map(|value| value.get("Status").is_some())
        .unwrap_or(false)
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
