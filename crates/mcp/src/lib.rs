//! MCP GraphQL protocol server.
//!
//! Exposes [`query::RunQueryHandler`] as the MCP tool `run-query`. Framing,
//! the `initialize` handshake, and request bookkeeping come from [`rmcp`];
//! the usual transport is the process's stdin/stdout, and
//! [`McpServer::serve`] accepts any async reader/writer pair.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Tool registration, request cancellation, and the
//! mapping of [`query::QueryError`] onto JSON-RPC live here. The [`query`]
//! crate never sees protocol types.
//!
//! ## Methods
//!
//! | Method | Behaviour |
//! |--------|-----------|
//! | `initialize` | Server info and `tools` + `logging` capabilities |
//! | `ping` | Empty result |
//! | `tools/list` | The `run-query` descriptor |
//! | `tools/call` | Runs `run-query`; requests are handled concurrently |
//! | `notifications/cancelled` | Cancels the named in-flight call |

use thiserror::Error;

pub mod server;
pub mod tools;

pub use server::{McpServer, SERVER_NAME};

/// Failures of the session itself (not of individual tool calls).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("MCP session failed to initialize: {0}")]
    Initialize(#[from] rmcp::service::ServerInitializeError),

    #[error("MCP session task failed: {0}")]
    Session(#[source] tokio::task::JoinError),
}
