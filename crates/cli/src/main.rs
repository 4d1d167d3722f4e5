//! MCP GraphQL entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: read `--endpoint` and the repeatable
//!    `--headers KEY=VALUE` flags and validate them into a [`QueryConfig`].
//! 2. **Wire observability**: configure `tracing-subscriber` on stderr (text
//!    or JSON). Stdout carries the protocol and must stay clean.
//! 3. **Construct infrastructure**: create the [`HttpTransport`], wrap it in
//!    a [`RunQueryHandler`], and hand that to the [`McpServer`].
//! 4. **Serve**: run the MCP server on stdio until the client closes stdin.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use graphql_http::HttpTransport;
use mcp::McpServer;
use query::{QueryConfig, RunQueryHandler, DEFAULT_ENDPOINT};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mcp-graphql",
    version,
    about = "MCP server exposing a GraphQL endpoint as the run-query tool"
)]
struct Args {
    /// GraphQL server URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Default header for every GraphQL request, e.g. "Authorization=Bearer ...". Repeatable.
    #[arg(long = "headers", value_name = "KEY=VALUE")]
    headers: Vec<String>,

    /// Log output format (logs are written to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(args.log_format);

    let config = QueryConfig::from_flags(&args.endpoint, &args.headers)
        .context("invalid configuration")?;
    info!(
        endpoint = %config.endpoint,
        default_headers = ?config.default_headers.names().collect::<Vec<_>>(),
        "starting MCP GraphQL server"
    );

    let transport = HttpTransport::new().context("failed to create HTTP transport")?;
    let server = McpServer::new(RunQueryHandler::new(config, transport));
    server.serve_stdio().await.context("MCP server failed")?;

    info!("stdin closed; shutting down");
    Ok(())
}

fn setup_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
