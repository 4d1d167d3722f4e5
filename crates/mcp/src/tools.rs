//! The `run-query` tool as seen by MCP clients, and how its failures are reported.

use std::sync::Arc;

use query::{ErrorKind, QueryError, RUN_QUERY_TOOL};
use rmcp::model::{CallToolResult, Content, ErrorCode, ErrorData, JsonObject, Tool};
use serde_json::{json, Value};

/// JSON-RPC code for a request that was cancelled or ran out of time.
pub const REQUEST_CANCELLED: ErrorCode = ErrorCode(-32800);

/// Descriptor returned by `tools/list`.
pub fn run_query_tool() -> Tool {
    Tool::new(RUN_QUERY_TOOL, "Run a GraphQL query", Arc::new(input_schema()))
}

fn input_schema() -> JsonObject {
    let schema = json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "GraphQL query to run",
            },
            "variables": {
                "type": "string",
                "description": r#"variables. JSON e.g. {"id": "123"}"#,
            },
            "headers": {
                "type": "string",
                "description": r#"headers. JSON e.g. {"Content-Type": "application/json"}"#,
            },
        },
        "required": ["query"],
    });
    match schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Maps a [`QueryError`] onto the protocol.
///
/// Input mistakes are invalid params; interruptions use the cancellation code.
/// Transport and upstream failures are tool results flagged `isError` so the
/// calling model can read the message and react.
pub fn report(error: &QueryError) -> Result<CallToolResult, ErrorData> {
    let kind = error.kind();
    match kind {
        ErrorKind::TransportError | ErrorKind::UpstreamError => {
            Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
        }
        _ => {
            let code = if kind.is_interruption() {
                REQUEST_CANCELLED
            } else {
                ErrorCode::INVALID_PARAMS
            };
            Err(ErrorData::new(
                code,
                error.to_string(),
                Some(json!({ "kind": kind, "error": error })),
            ))
        }
    }
}
