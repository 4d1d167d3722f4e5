//! GraphQL dispatch: envelope construction, the single outbound call, and
//! response normalisation.

use std::time::Duration;

use serde::de::IgnoredAny;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ports::GraphQlTransport;
use crate::{CallContext, Endpoint, GraphQlEnvelope, HeaderSet, QueryError};

/// Upper bound on one invocation, regardless of the caller's deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends `query` to `endpoint` and returns the compacted response body.
///
/// Validation happens before anything touches the network: an empty query or
/// malformed variables fail without an HTTP call. The call is bounded by
/// [`REQUEST_TIMEOUT`] and by the caller's deadline, whichever is earlier, and
/// aborted as soon as the context is cancelled.
pub async fn dispatch<T>(
    ctx: &CallContext,
    transport: &T,
    endpoint: &Endpoint,
    query: &str,
    variables_json: Option<&str>,
    headers: &HeaderSet,
) -> Result<String, QueryError>
where
    T: GraphQlTransport + ?Sized,
{
    if query.is_empty() {
        return Err(QueryError::invalid_argument(
            "query",
            "must be a non-empty string",
        ));
    }

    let variables = parse_variables(variables_json)?;
    let body = serde_json::to_string(&GraphQlEnvelope { query, variables }).map_err(|e| {
        QueryError::InvalidVariablesFormat {
            input: variables_json.unwrap_or_default().to_string(),
            reason: format!("failed to encode GraphQL request: {e}"),
        }
    })?;

    let started = Instant::now();
    let ceiling = started + REQUEST_TIMEOUT;
    let (limit, limited_by_caller) = match ctx.deadline() {
        Some(deadline) if deadline < ceiling => (deadline, true),
        _ => (ceiling, false),
    };

    debug!(
        endpoint = %endpoint,
        body_len = body.len(),
        header_names = ?headers.names().collect::<Vec<_>>(),
        "posting GraphQL request"
    );

    let mut cancel = ctx.cancel_signal();
    let reply = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            debug!(endpoint = %endpoint, "GraphQL request cancelled");
            return Err(QueryError::Cancelled);
        }
        _ = tokio::time::sleep_until(limit) => {
            let elapsed = limit.saturating_duration_since(started);
            warn!(endpoint = %endpoint, ?elapsed, limited_by_caller, "GraphQL request timed out");
            return Err(if limited_by_caller {
                QueryError::DeadlineExceeded { after: elapsed }
            } else {
                QueryError::Transport {
                    endpoint: endpoint.to_string(),
                    cause: format!("request timed out after {REQUEST_TIMEOUT:?}"),
                }
            });
        }
        reply = transport.post(endpoint, body, headers) => reply?,
    };

    debug!(
        endpoint = %endpoint,
        status = reply.status,
        body_len = reply.body.len(),
        "received GraphQL response"
    );

    if reply.status >= 400 {
        return Err(QueryError::Upstream {
            status: reply.status,
            body: reply.body,
        });
    }

    Ok(compact_json(reply.body))
}

/// Parses the caller's variables. Absent or empty text means "no variables".
fn parse_variables(variables_json: Option<&str>) -> Result<Option<Value>, QueryError> {
    match variables_json.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| QueryError::InvalidVariablesFormat {
                input: raw.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Strips insignificant whitespace from a JSON body.
///
/// Every token is kept byte for byte: numbers keep their spelling and
/// precision, strings keep their escapes, and object keys keep their order.
/// A body that is not JSON is returned as-is.
pub fn compact_json(body: String) -> String {
    if let Err(e) = serde_json::from_str::<IgnoredAny>(&body) {
        debug!(error = %e, "response body is not JSON; passing through unchanged");
        return body;
    }

    let mut compact = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in body.chars() {
        if in_string {
            compact.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if !matches!(c, ' ' | '\t' | '\n' | '\r') {
            in_string = c == '"';
            compact.push(c);
        }
    }
    compact
}
