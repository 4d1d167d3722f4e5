//! MCP GraphQL HTTP transport adapter.
//!
//! Implements the [`query::GraphQlTransport`] port with [`reqwest`]. One
//! [`HttpTransport`] is built at startup and shared by every invocation; the
//! underlying client holds no per-call state.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Header encoding, request construction, and network
//! error mapping live here. The [`query`] crate sees only
//! [`query::GraphQlTransport`] and [`query::HttpReply`].

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use query::{Endpoint, GraphQlTransport, HeaderSet, HttpReply, QueryError, REQUEST_TIMEOUT};

/// Errors raised while constructing the transport.
#[derive(Debug, Error)]
pub enum HttpTransportError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Posts GraphQL envelopes over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose client enforces [`REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self, HttpTransportError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Builds a transport whose client enforces `timeout` on every request.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpTransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mcp-graphql/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    async fn post(
        &self,
        endpoint: &Endpoint,
        body: String,
        headers: &HeaderSet,
    ) -> Result<HttpReply, QueryError> {
        let headers = wire_headers(headers)?;

        let response = self
            .client
            .post(endpoint.as_str())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, "failed to execute GraphQL request", &e))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(endpoint, "failed to read response body", &e))?;
        let body = match String::from_utf8(bytes.to_vec()) {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    status,
                    valid_up_to = e.utf8_error().valid_up_to(),
                    "response body is not valid UTF-8; replacing invalid sequences"
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        debug!(status, body_len = body.len(), "HTTP exchange finished");
        Ok(HttpReply { status, body })
    }
}

/// Builds the outbound header map.
///
/// `Content-Type: application/json` is set first; any entry in `headers`
/// replaces it. Names that differ only in case collapse onto one wire header,
/// the later entry in the set winning. [`query::merge`] appends per-call
/// overrides after the defaults, so an override always wins.
pub fn wire_headers(headers: &HeaderSet) -> Result<HeaderMap, QueryError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in headers.iter() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| QueryError::InvalidHeaderFormat {
                input: name.to_string(),
                reason: format!("invalid header name: {e}"),
            })?;
        // The value may be a credential; only its name is echoed back.
        let header_value = HeaderValue::from_str(value).map_err(|e| QueryError::InvalidHeaderFormat {
            input: name.to_string(),
            reason: format!("invalid header value: {e}"),
        })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

fn transport_error(endpoint: &Endpoint, context: &str, error: &reqwest::Error) -> QueryError {
    let mut cause = format!("{context}: {error}");
    let mut source = error.source();
    while let Some(inner) = source {
        cause.push_str(": ");
        cause.push_str(&inner.to_string());
        source = inner.source();
    }
    if error.is_timeout() {
        cause.push_str(" (timed out)");
    }

    QueryError::Transport {
        endpoint: endpoint.to_string(),
        cause,
    }
}
