//! MCP tools module
//!
//! Provides MCP tools for DevDocs documentation queries and source control.

pub mod docs;
pub mod health;
pub mod source;

use crate::source::SourceKind;
use async_trait::async_trait;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult, Tool as McpTool};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool definition
    fn definition(&self) -> McpTool;

    /// Execute tool
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError>;
}

/// Tool registry
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    #[must_use]
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register tool
    #[must_use]
    pub fn register<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Get all tool definitions
    #[must_use]
    pub fn get_tools(&self) -> Vec<McpTool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute tool
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        for tool in &self.tools {
            if tool.definition().name == name {
                tracing::debug!("Executing tool {}", name);
                return tool.execute(arguments).await;
            }
        }

        Err(CallToolError::unknown_tool(name.to_string()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create default tool registry
#[must_use]
pub fn create_default_registry(service: &Arc<docs::DocService>) -> ToolRegistry {
    ToolRegistry::new()
        .register(docs::catalog::ListDocumentationsToolImpl::new(service.clone()))
        .register(docs::catalog::SearchDocumentationToolImpl::new(service.clone()))
        .register(docs::page::GetPageContentToolImpl::new(service.clone()))
        .register(docs::catalog::GetDocumentationIndexToolImpl::new(service.clone()))
        .register(docs::catalog::GetTypeEntriesToolImpl::new(service.clone()))
        .register(docs::catalog::SearchAcrossDocsToolImpl::new(service.clone()))
        .register(docs::page::GetMultiplePagesToolImpl::new(service.clone()))
        .register(docs::page::GetExamplesToolImpl::new(service.clone()))
        .register(docs::page::ExportDocumentationToolImpl::new(service.clone()))
        .register(docs::cache::GetCacheStatsToolImpl::new(service.clone()))
        .register(docs::cache::ClearCacheToolImpl::new(service.clone()))
        .register(docs::cache::OfflineModeStatusToolImpl::new(service.clone()))
        .register(health::SourceStatusToolImpl::new(service.clone()))
        .register(source::SetSourceModeToolImpl::new(service.clone()))
        .register(source::SetLocalUrlToolImpl::new(service.clone()))
}

/// Deserialize tool arguments; a missing argument object counts as empty
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: serde_json::Value,
) -> std::result::Result<T, CallToolError> {
    let arguments = if arguments.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        arguments
    };

    serde_json::from_value(arguments).map_err(|e| {
        CallToolError::invalid_arguments(tool, Some(format!("Failed to parse arguments: {e}")))
    })
}

/// Map a service error onto a tool error
pub(crate) fn tool_error(error: &crate::error::Error) -> CallToolError {
    CallToolError::from_message(error.to_string())
}

/// Plain text tool result
pub(crate) fn text_result(content: String) -> CallToolResult {
    CallToolResult::text_content(vec![content.into()])
}

/// Provenance line appended to tool output
pub(crate) fn source_note(source: SourceKind) -> String {
    format!("\n\n_Source: {source}_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct OptionalArgs {
        tech: Option<String>,
    }

    #[test]
    fn test_null_arguments_are_empty() {
        let args: OptionalArgs = parse_arguments("clear_cache", serde_json::Value::Null).unwrap();
        assert!(args.tech.is_none());
    }

    #[test]
    fn test_bad_arguments_rejected() {
        let result: std::result::Result<OptionalArgs, _> =
            parse_arguments("clear_cache", serde_json::json!({"tech": 42}));
        assert!(result.is_err());
    }

    #[test]
    fn test_source_note() {
        assert_eq!(source_note(SourceKind::Local), "\n\n_Source: local_");
    }
}
