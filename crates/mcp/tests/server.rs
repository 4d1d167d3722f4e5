//! Drives [`McpServer`] over an in-memory pipe with a fake GraphQL transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mcp::McpServer;
use query::{Endpoint, GraphQlTransport, HeaderSet, HttpReply, QueryConfig, QueryError, RunQueryHandler};
use serde_json::{json, Value};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

/// Replies with a fixed status/body, or never replies when `hang` is set.
struct FakeTransport {
    status: u16,
    body: &'static str,
    hang: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GraphQlTransport for FakeTransport {
    async fn post(
        &self,
        _endpoint: &Endpoint,
        _body: String,
        _headers: &HeaderSet,
    ) -> Result<HttpReply, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(HttpReply {
            status: self.status,
            body: self.body.to_string(),
        })
    }
}

struct Client {
    input: WriteHalf<DuplexStream>,
    output: Lines<BufReader<ReadHalf<DuplexStream>>>,
    server: JoinHandle<Result<(), mcp::ProtocolError>>,
    calls: Arc<AtomicUsize>,
    initialized: Value,
}

impl Client {
    /// Starts a server and completes the `initialize` handshake.
    async fn start(status: u16, body: &'static str, hang: bool) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = FakeTransport {
            status,
            body,
            hang,
            calls: Arc::clone(&calls),
        };
        let config =
            QueryConfig::from_flags("http://example.test/graphql", ["X-Env=test"]).unwrap();
        let server = McpServer::new(RunQueryHandler::new(config, transport));

        let (client_end, server_end) = duplex(64 * 1024);
        let (server_in, server_out) = tokio::io::split(server_end);
        let server = tokio::spawn(async move { server.serve(server_in, server_out).await });

        let (client_out, client_in) = tokio::io::split(client_end);
        let mut client = Self {
            input: client_in,
            output: BufReader::new(client_out).lines(),
            server,
            calls,
            initialized: Value::Null,
        };

        let initialized = client
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0"},
                }),
            )
            .await;
        client.initialized = initialized;
        client
            .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        client
    }

    async fn send(&mut self, message: Value) {
        let line = message.to_string();
        self.input.write_all(line.as_bytes()).await.unwrap();
        self.input.write_all(b"\n").await.unwrap();
        self.input.flush().await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.output.next_line())
            .await
            .expect("response within timeout")
            .unwrap()
            .expect("server still open");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.recv().await
    }

    async fn shutdown(self) {
        drop(self.input);
        drop(self.output);
        self.server.await.unwrap().unwrap();
    }
}

fn run_query(id: i64, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": "run-query", "arguments": arguments},
    })
}

#[tokio::test]
async fn initialize_reports_server_info_and_capabilities() {
    let client = Client::start(200, "{}", false).await;

    let response = &client.initialized;
    assert_eq!(response["id"], 0);
    let result = &response["result"];
    assert!(result["protocolVersion"].is_string());
    assert_eq!(result["serverInfo"]["name"], "MCP GraphQL");
    assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["logging"].is_object());

    client.shutdown().await;
}

#[tokio::test]
async fn lists_the_run_query_tool() {
    let mut client = Client::start(200, "{}", false).await;
    let response = client.request(2, "tools/list", json!({})).await;

    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "run-query");
    assert_eq!(tools[0]["description"], "Run a GraphQL query");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["query"]));

    client.shutdown().await;
}

#[tokio::test]
async fn ping_returns_empty_result() {
    let mut client = Client::start(200, "{}", false).await;
    let response = client.request(3, "ping", json!({})).await;
    assert_eq!(response["id"], 3);
    assert_eq!(response["result"], json!({}));
    client.shutdown().await;
}

#[tokio::test]
async fn run_query_returns_compacted_text() {
    let mut client = Client::start(200, "{ \"data\" : { \"x\" : 1 } }", false).await;
    client.send(run_query(4, json!({"query": "{ x }"}))).await;
    let response = client.recv().await;

    assert_eq!(response["id"], 4);
    let result = &response["result"];
    assert_ne!(result["isError"], true);
    assert_eq!(result["content"][0]["type"], "text");
    assert_eq!(result["content"][0]["text"], "{\"data\":{\"x\":1}}");
    client.shutdown().await;
}

#[tokio::test]
async fn upstream_failure_is_a_tool_error() {
    let mut client = Client::start(500, "\"boom\"", false).await;
    client.send(run_query(5, json!({"query": "{ x }"}))).await;
    let response = client.recv().await;

    let result = &response["result"];
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("500") && text.contains("boom"));
    client.shutdown().await;
}

#[tokio::test]
async fn empty_query_is_invalid_params_without_http_call() {
    let mut client = Client::start(200, "{}", false).await;
    client.send(run_query(6, json!({"query": ""}))).await;
    let response = client.recv().await;

    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["kind"], "invalid_argument");
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let mut client = Client::start(200, "{}", false).await;

    let response = client
        .request(7, "tools/call", json!({"name": "drop-tables", "arguments": {}}))
        .await;
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["message"], "unknown tool: drop-tables");
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);

    client.shutdown().await;
}

#[tokio::test]
async fn cancellation_notification_aborts_the_call() {
    let mut client = Client::start(200, "{}", true).await;
    client.send(run_query(9, json!({"query": "{ slow }"}))).await;
    client
        .send(json!({
            "jsonrpc": "2.0",
            "method": "notifications/cancelled",
            "params": {"requestId": 9, "reason": "user aborted"},
        }))
        .await;

    let response = client.recv().await;
    assert_eq!(response["id"], 9);
    assert_eq!(response["error"]["code"], -32800);
    assert_eq!(response["error"]["data"]["kind"], "cancelled");
    client.shutdown().await;
}

#[tokio::test]
async fn concurrent_calls_are_answered_independently() {
    let mut client = Client::start(200, r#"{"data":null}"#, false).await;
    client.send(run_query(10, json!({"query": "{ a }"}))).await;
    client.send(run_query(11, json!({"query": "{ b }"}))).await;

    let mut ids = vec![client.recv().await["id"].clone(), client.recv().await["id"].clone()];
    ids.sort_by_key(|id| id.as_i64());
    assert_eq!(ids, vec![json!(10), json!(11)]);
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    client.shutdown().await;
}
