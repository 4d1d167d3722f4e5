//! The MCP server handler wrapping [`RunQueryHandler`].

use query::{cancellation, CallContext, GraphQlTransport, RunQueryHandler, ToolName};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ServerHandler, ServiceExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::tools::{report, run_query_tool};
use crate::ProtocolError;

/// Name reported in the `initialize` handshake.
pub const SERVER_NAME: &str = "MCP GraphQL";

/// Serves the `run-query` tool over MCP.
pub struct McpServer<T> {
    handler: RunQueryHandler<T>,
}

impl<T> McpServer<T>
where
    T: GraphQlTransport + 'static,
{
    pub fn new(handler: RunQueryHandler<T>) -> Self {
        Self { handler }
    }

    /// Serves on the process's stdin and stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<(), ProtocolError> {
        let (stdin, stdout) = rmcp::transport::stdio();
        self.serve(stdin, stdout).await
    }

    /// Serves one client until `reader` reaches end of input.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> Result<(), ProtocolError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let session = ServiceExt::serve(self, (reader, writer)).await?;
        info!("client initialized");

        let reason = session.waiting().await.map_err(ProtocolError::Session)?;
        debug!(?reason, "MCP session ended");
        Ok(())
    }
}

impl<T> ServerHandler for McpServer<T>
where
    T: GraphQlTransport + 'static,
{
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder()
            .enable_logging()
            .enable_tools()
            .build();
        info.server_info = server_info;
        info.instructions = Some(format!(
            "Runs GraphQL queries against {} with the run-query tool.",
            self.handler.config().endpoint
        ));
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(vec![run_query_tool()]))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let tool = ToolName::new(request.name.into_owned())
            .ok_or_else(|| ErrorData::invalid_params("tool name is required", None))?;
        if tool.as_str() != self.handler.tool_name() {
            return Err(ErrorData::invalid_params(format!("unknown tool: {tool}"), None));
        }
        let arguments = request.arguments.unwrap_or_default();

        // The session cancels the request token on `notifications/cancelled`.
        let (cancel, signal) = cancellation();
        let token = context.ct.clone();
        let request_id = context.id.clone();
        let watcher = tokio::spawn(async move {
            token.cancelled().await;
            info!(id = ?request_id, "cancelling tool call");
            cancel.cancel();
        });

        let result = self
            .handler
            .call(&CallContext::with_cancel(signal), &arguments)
            .await;
        watcher.abort();

        match result {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => report(&e),
        }
    }
}
