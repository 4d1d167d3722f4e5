//! The `run-query` tool handler.
//!
//! Decodes the argument bag, merges headers, and dispatches. This is the only
//! entry point the protocol layer calls.

use serde_json::{Map, Value};
use tracing::{info, info_span, warn, Instrument};

use crate::dispatch::dispatch;
use crate::headers::merge;
use crate::ports::GraphQlTransport;
use crate::{CallContext, InvocationId, QueryConfig, QueryError, RunQueryRequest};

/// Name under which the handler is exposed to protocol clients.
pub const RUN_QUERY_TOOL: &str = "run-query";

/// Executes GraphQL queries against the configured endpoint.
///
/// Holds only immutable configuration and a transport, so one instance can be
/// shared across concurrent invocations.
#[derive(Debug)]
pub struct RunQueryHandler<T> {
    config: QueryConfig,
    transport: T,
}

impl<T: GraphQlTransport> RunQueryHandler<T> {
    pub fn new(config: QueryConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Tool name this handler answers to.
    pub fn tool_name(&self) -> &'static str {
        RUN_QUERY_TOOL
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Handles one invocation with the raw protocol arguments.
    pub async fn call(
        &self,
        ctx: &CallContext,
        arguments: &Map<String, Value>,
    ) -> Result<String, QueryError> {
        let invocation_id = InvocationId::new_random();
        let span = info_span!(
            "run_query",
            invocation_id = %invocation_id,
            tool = RUN_QUERY_TOOL,
            endpoint = %self.config.endpoint,
        );

        async {
            let request = RunQueryRequest::from_arguments(arguments)?;
            let result = self.execute(ctx, &request).await;
            match &result {
                Ok(response) => info!(response_len = response.len(), "query completed"),
                Err(e) => warn!(kind = %e.kind(), error = %e, "query failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Handles one already-decoded invocation.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        request: &RunQueryRequest,
    ) -> Result<String, QueryError> {
        let headers = merge(&self.config.default_headers, request.headers.as_deref())?;
        dispatch(
            ctx,
            &self.transport,
            &self.config.endpoint,
            request.query.as_str(),
            request.variables.as_deref(),
            &headers,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{Endpoint, HeaderSet, HttpReply};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, String, HeaderSet)>>,
    }

    #[async_trait]
    impl GraphQlTransport for Recorder {
        async fn post(
            &self,
            endpoint: &Endpoint,
            body: String,
            headers: &HeaderSet,
        ) -> Result<HttpReply, QueryError> {
            self.seen
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body, headers.clone()));
            Ok(HttpReply {
                status: 200,
                body: r#"{ "data": { "viewer": { "id": "u1" } } }"#.to_string(),
            })
        }
    }

    fn handler() -> RunQueryHandler<Recorder> {
        let config = QueryConfig::from_flags(
            "http://example.test/graphql",
            ["X-Env=test", "Authorization=Bearer d"],
        )
        .unwrap();
        RunQueryHandler::new(config, Recorder::default())
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test arguments must be an object"),
        }
    }

    #[tokio::test]
    async fn sends_defaults_and_minimal_envelope() {
        let handler = handler();
        let out = handler
            .call(&CallContext::background(), &args(json!({"query": "{ viewer { id } }"})))
            .await
            .unwrap();
        assert_eq!(out, r#"{"data":{"viewer":{"id":"u1"}}}"#);

        let seen = handler.transport.seen.lock().unwrap();
        let (endpoint, body, headers) = &seen[0];
        assert_eq!(endpoint, "http://example.test/graphql");
        assert_eq!(body, r#"{"query":"{ viewer { id } }"}"#);
        assert_eq!(headers.get("X-Env"), Some("test"));
    }

    #[tokio::test]
    async fn per_call_headers_override_defaults() {
        let handler = handler();
        handler
            .call(
                &CallContext::background(),
                &args(json!({
                    "query": "{ a }",
                    "headers": r#"{"Authorization":"Bearer call"}"#,
                })),
            )
            .await
            .unwrap();

        let seen = handler.transport.seen.lock().unwrap();
        assert_eq!(seen[0].2.get("Authorization"), Some("Bearer call"));
        assert_eq!(seen[0].2.get("X-Env"), Some("test"));
        assert_eq!(handler.config().default_headers.get("Authorization"), Some("Bearer d"));
    }

    #[tokio::test]
    async fn bad_inputs_never_reach_the_transport() {
        let handler = handler();
        let cases = [
            json!({"query": ""}),
            json!({"query": "{ a }", "headers": "{not json}"}),
            json!({"query": "{ a }", "variables": "{bad"}),
            json!({"query": "{ a }", "variables": 7}),
        ];
        for case in cases {
            let err = handler
                .call(&CallContext::background(), &args(case))
                .await
                .unwrap_err();
            assert!(err.kind().is_caller_error(), "unexpected error: {err:?}");
        }
        assert!(handler.transport.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn exposes_run_query_tool_name() {
        assert_eq!(handler().tool_name(), "run-query");
    }
}
