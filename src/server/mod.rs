//! Server module
//!
//! Wires configuration, sources, store and tools into an MCP server and runs
//! it over the configured transport.

pub mod handler;
pub mod transport;

use crate::cache::Store;
use crate::config::AppConfig;
use crate::error::Result;
use crate::resolver::Resolver;
use crate::source::HttpSource;
use crate::tools::docs::DocService;
use crate::tools::ToolRegistry;
use rust_mcp_sdk::schema::{
    Icon, IconTheme, Implementation, InitializeResult, ProtocolVersion, ServerCapabilities,
    ServerCapabilitiesTools,
};
use std::sync::Arc;

const ICON_URL: &str = "https://devdocs.io/favicon.ico";

/// MCP server
#[derive(Clone)]
pub struct DevDocsServer {
    config: AppConfig,
    tool_registry: Arc<ToolRegistry>,
    service: Arc<DocService>,
}

impl DevDocsServer {
    /// Create a server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the store or the HTTP clients cannot be created
    pub fn new(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::from(crate::cache::create_store(&config.cache)?);
        let local = Arc::new(HttpSource::local(config.sources.local_timeout())?);
        let remote = Arc::new(HttpSource::remote(config.sources.remote_timeout())?);

        let resolver = Resolver::new(local, remote, store)
            .with_mode(config.sources.mode())
            .with_local_url(&config.sources.local_url);

        Ok(Self::with_resolver(config, Arc::new(resolver)))
    }

    /// Create a server around an existing resolver
    #[must_use]
    pub fn with_resolver(config: AppConfig, resolver: Arc<Resolver>) -> Self {
        let service = Arc::new(DocService::new(resolver));
        let tool_registry = Arc::new(crate::tools::create_default_registry(&service));

        Self {
            config,
            tool_registry,
            service,
        }
    }

    /// Get configuration
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get tool registry
    #[must_use]
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Get documentation service
    #[must_use]
    pub fn service(&self) -> &Arc<DocService> {
        &self.service
    }

    /// Get server information
    #[must_use]
    pub fn server_info(&self) -> InitializeResult {
        let icon = |theme| Icon {
            src: ICON_URL.to_string(),
            mime_type: Some("image/x-icon".to_string()),
            sizes: vec!["32x32".to_string()],
            theme: Some(theme),
        };

        InitializeResult {
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                title: Some("DevDocs MCP Server".to_string()),
                description: self.config.server.description.clone(),
                icons: vec![icon(IconTheme::Light), icon(IconTheme::Dark)],
                website_url: Some("https://devdocs.io".to_string()),
            },
            capabilities: ServerCapabilities {
                tools: Some(ServerCapabilitiesTools { list_changed: None }),
                resources: None,
                prompts: None,
                experimental: None,
                completions: None,
                logging: None,
                tasks: None,
            },
            protocol_version: ProtocolVersion::V2025_11_25.into(),
            instructions: Some(format!(
                "Query DevDocs documentation: list and search documentation sets, browse indexes, read pages and code examples. \
                 Content comes from a local DevDocs server, the cache or devdocs.io (current source mode: {}). \
                 Use source_status to diagnose sources and set_source_mode to switch, e.g. to offline.",
                self.service.resolver().mode()
            )),
            meta: None,
        }
    }

    /// Run the stdio server
    pub async fn run_stdio(&self) -> Result<()> {
        transport::run_stdio_server(self).await
    }

    /// Run the HTTP server
    pub async fn run_http(&self) -> Result<()> {
        transport::run_http_server(self).await
    }

    /// Run the SSE server
    pub async fn run_sse(&self) -> Result<()> {
        transport::run_sse_server(self).await
    }

    /// Run the hybrid HTTP + SSE server
    pub async fn run_hybrid(&self) -> Result<()> {
        transport::run_hybrid_server(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Mode;

    #[test]
    fn test_server_from_memory_config() {
        let mut config = AppConfig::default();
        config.cache.cache_type = "memory".to_string();
        config.sources.mode = "offline".to_string();
        config.sources.local_url = "http://docs.lan:9292/".to_string();

        let server = DevDocsServer::new(config).unwrap();
        assert_eq!(server.service().resolver().mode(), Mode::Offline);
        assert_eq!(server.service().resolver().local_url(), "http://docs.lan:9292");
        assert_eq!(server.tool_registry().len(), 15);

        let info = server.server_info();
        assert_eq!(info.server_info.name, "devdocs-mcp");
        assert!(info.instructions.unwrap().contains("offline"));
    }
}
