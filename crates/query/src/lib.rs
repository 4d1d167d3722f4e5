//! Core domain for MCP GraphQL.
//!
//! This crate holds everything with decision logic: merging default and
//! per-call headers, building the GraphQL envelope, bounding the outbound call
//! by timeout and cancellation, and normalising the response. It defines the
//! [`GraphQlTransport`] port; infrastructure crates supply the HTTP client and
//! the protocol server.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** No HTTP or protocol crates are
//! permitted here. It defines *what* is sent; `graphql-http` defines *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype values (`QueryText`, `ToolName`, `InvocationId`, `Endpoint`) |
//! | [`types`] | `HeaderSet`, `RunQueryRequest`, `GraphQlEnvelope`, `HttpReply` |
//! | [`errors`] | `QueryError`, `ConfigError`, `ErrorKind` |
//! | [`config`] | `QueryConfig` and `KEY=VALUE` header flag parsing |
//! | [`context`] | Per-call deadline and cancellation |
//! | [`headers`] | Header merger |
//! | [`dispatch`] | Query dispatcher |
//! | [`handler`] | `run-query` tool handler |
//! | [`ports`] | `GraphQlTransport` outbound port |

pub mod config;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod handler;
pub mod headers;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{parse_header_flag, QueryConfig, DEFAULT_ENDPOINT};
pub use context::{cancellation, CallContext, CancelHandle, CancelSignal};
pub use dispatch::{compact_json, dispatch, REQUEST_TIMEOUT};
pub use errors::{ConfigError, ErrorKind, QueryError};
pub use handler::{RunQueryHandler, RUN_QUERY_TOOL};
pub use headers::merge;
pub use identifiers::{Endpoint, InvocationId, QueryText, ToolName};
pub use ports::GraphQlTransport;
pub use types::{GraphQlEnvelope, HeaderSet, HttpReply, RunQueryRequest};
