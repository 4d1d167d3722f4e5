//! Outbound port for the GraphQL dispatcher.
//!
//! The domain decides *what* to send and how to interpret the reply; an
//! infrastructure crate decides *how* to put it on the wire. The production
//! implementation is `graphql_http::HttpTransport`.

use async_trait::async_trait;

use crate::{Endpoint, HeaderSet, HttpReply, QueryError};

/// Performs the single HTTP POST of a GraphQL invocation.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    /// Posts `body` to `endpoint` and returns the status and full response body.
    ///
    /// Implementations must send `Content-Type: application/json` unless
    /// `headers` supplies its own `Content-Type`, in which case that value
    /// replaces the default. Every entry in `headers` is sent.
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidHeaderFormat`] if a header cannot be encoded on the wire.
    /// - [`QueryError::Transport`] on connection failure or timeout.
    ///
    /// A non-success HTTP status is **not** an error at this layer.
    async fn post(
        &self,
        endpoint: &Endpoint,
        body: String,
        headers: &HeaderSet,
    ) -> Result<HttpReply, QueryError>;
}

#[async_trait]
impl<T: GraphQlTransport + ?Sized> GraphQlTransport for std::sync::Arc<T> {
    async fn post(
        &self,
        endpoint: &Endpoint,
        body: String,
        headers: &HeaderSet,
    ) -> Result<HttpReply, QueryError> {
        (**self).post(endpoint, body, headers).await
    }
}
