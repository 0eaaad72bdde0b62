//
// Purpose:
//
// This Rust application implements an MCP (Model Context Protocol) server that acts as a
// bridge to an OpenCTI threat intelligence platform. It exposes a fixed set of OpenCTI
// GraphQL queries as tools that can be invoked by MCP clients (e.g., AI models).
//
// Structure:
// - `main()`: Entry point. Initializes logging (tracing), loads the configuration,
//   builds the `OpenCtiToolsServer` and serves it over the stdio transport.
//
// - `OpenCtiToolsServer` (library, `server.rs`): implements `rmcp::ServerHandler`.
//   Tool listing and dispatch are driven by the `OpenCtiTool` enum (`tools` module).
//
// - `opencti` module: `OpenCtiClient` posts GraphQL documents to `<OPENCTI_URL>/graphql`.
//
// Configuration:
// The server requires the `OPENCTI_TOKEN` environment variable. `OPENCTI_URL` defaults to
// `http://localhost:8080` and `VERIFY_SSL` to `true`. A `.env` file is honoured.
// Logging goes to stderr and is controlled by `RUST_LOG`.

use clap::Parser;
use dotenv::dotenv;
use mcp_server_opencti::{OpenCtiConfig, OpenCtiToolsServer};
use rmcp::{transport::stdio, ServiceExt};

#[derive(Parser, Debug)]
#[command(name = "mcp-server-opencti", version)]
#[command(about = "OpenCTI Threat Intelligence Platform MCP Server")]
struct Args {
    // Only the stdio transport is supported; configuration comes from the environment.
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _args = Args::parse();

    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting OpenCTI MCP Server...");

    let config = OpenCtiConfig::from_env().inspect_err(|e| {
        tracing::error!("Error loading OpenCTI configuration: {}", e);
    })?;

    let server = OpenCtiToolsServer::new(&config)?;

    tracing::info!(base_url = %config.base_url, "Using stdio transport");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
