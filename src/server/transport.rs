//! Transport module
//!
//! Stdio, Streamable HTTP and SSE transports.

use crate::error::{Error, Result};
use crate::server::handler::DevDocsHandler;
use crate::server::DevDocsServer;
use rust_mcp_sdk::{
    error::McpSdkError,
    event_store,
    mcp_server::{hyper_server, server_runtime, HyperServerOptions, McpServerOptions},
    McpServer, StdioTransport, ToMcpServerHandler, TransportOptions,
};
use std::sync::Arc;

/// Run the stdio server
pub async fn run_stdio_server(server: &DevDocsServer) -> Result<()> {
    tracing::info!("Starting stdio MCP server...");

    let server_info = server.server_info();
    let handler = DevDocsHandler::new(Arc::new(server.clone()));

    let transport = StdioTransport::new(TransportOptions::default())
        .map_err(|e| Error::Mcp(e.to_string()))?;

    let mcp_server: Arc<rust_mcp_sdk::mcp_server::ServerRuntime> =
        server_runtime::create_server(McpServerOptions {
            server_details: server_info,
            transport,
            handler: handler.to_mcp_server_handler(),
            task_store: None,
            client_task_store: None,
        });

    tracing::info!("Stdio MCP server started, waiting for a client...");
    mcp_server
        .start()
        .await
        .map_err(|e: McpSdkError| Error::Mcp(e.to_string()))?;

    Ok(())
}

fn hyper_options(server: &DevDocsServer, sse_support: bool) -> HyperServerOptions {
    let config = &server.config().server;
    HyperServerOptions {
        host: config.host.clone(),
        port: config.port,
        transport_options: Arc::new(TransportOptions::default()),
        sse_support,
        event_store: Some(Arc::new(event_store::InMemoryEventStore::default())),
        task_store: None,
        client_task_store: None,
        allowed_hosts: Some(vec![
            "localhost".to_string(),
            "127.0.0.1".to_string(),
            "0.0.0.0".to_string(),
        ]),
        allowed_origins: Some(vec!["*".to_string()]),
        ..Default::default()
    }
}

async fn run_hyper_server(server: &DevDocsServer, sse_support: bool, label: &str) -> Result<()> {
    let config = &server.config().server;
    tracing::info!(
        "Starting {} MCP server on {}:{}...",
        label,
        config.host,
        config.port
    );

    let handler = DevDocsHandler::new(Arc::new(server.clone()));
    let mcp_server = hyper_server::create_server(
        server.server_info(),
        handler.to_mcp_server_handler(),
        hyper_options(server, sse_support),
    );

    tracing::info!("{} MCP server listening on {}:{}", label, config.host, config.port);
    mcp_server
        .start()
        .await
        .map_err(|e: McpSdkError| Error::Mcp(e.to_string()))?;

    Ok(())
}

/// Run the Streamable HTTP server
pub async fn run_http_server(server: &DevDocsServer) -> Result<()> {
    run_hyper_server(server, false, "HTTP").await
}

/// Run the SSE server
pub async fn run_sse_server(server: &DevDocsServer) -> Result<()> {
    run_hyper_server(server, true, "SSE").await
}

/// Run the hybrid server (HTTP and SSE on one port)
pub async fn run_hybrid_server(server: &DevDocsServer) -> Result<()> {
    run_hyper_server(server, server.config().server.enable_sse, "hybrid").await
}

/// Transport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Stdio transport for CLI integration
    Stdio,
    /// Streamable HTTP transport
    Http,
    /// Server-Sent Events transport
    Sse,
    /// HTTP and SSE together
    Hybrid,
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "sse" => Ok(TransportMode::Sse),
            "hybrid" => Ok(TransportMode::Hybrid),
            _ => Err(format!("Unknown transport mode: {s}")),
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Stdio => write!(f, "stdio"),
            TransportMode::Http => write!(f, "http"),
            TransportMode::Sse => write!(f, "sse"),
            TransportMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Run the server over the given transport
pub async fn run_server_with_mode(server: &DevDocsServer, mode: TransportMode) -> Result<()> {
    match mode {
        TransportMode::Stdio => run_stdio_server(server).await,
        TransportMode::Http => run_http_server(server).await,
        TransportMode::Sse => run_sse_server(server).await,
        TransportMode::Hybrid => run_hybrid_server(server).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mode_parse() {
        assert_eq!("STDIO".parse::<TransportMode>(), Ok(TransportMode::Stdio));
        assert_eq!("hybrid".parse::<TransportMode>(), Ok(TransportMode::Hybrid));
        assert!("carrier-pigeon".parse::<TransportMode>().is_err());
        assert_eq!(TransportMode::Sse.to_string(), "sse");
    }
}
