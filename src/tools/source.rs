//! Source control tools
#![allow(missing_docs)]

use crate::resolver::Mode;
use crate::tools::docs::DocService;
use crate::tools::{parse_arguments, text_result, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

/// Change the source mode
#[macros::mcp_tool(
    name = "set_source_mode",
    title = "Set Source Mode",
    description = "Choose where documentation comes from: auto (local server, then cache, then devdocs.io), local_only, remote_only or offline (cache only). Unknown values select auto.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = false,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct SetSourceModeTool {
    /// Mode name
    #[json_schema(
        title = "Mode",
        description = "auto, local_only, remote_only or offline"
    )]
    pub mode: String,
}

pub struct SetSourceModeToolImpl {
    service: Arc<DocService>,
}

impl SetSourceModeToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for SetSourceModeToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        SetSourceModeTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: SetSourceModeTool = parse_arguments("set_source_mode", arguments)?;
        let resolver = self.service.resolver();

        let previous = resolver.mode();
        let known = params.mode.parse::<Mode>().is_ok();
        let mode = Mode::parse_or_default(&params.mode);
        resolver.set_mode(mode);

        let mut message = format!("Source mode: {previous} -> {mode}");
        if !known {
            let _ = write!(
                message,
                "\n'{}' is not a known mode; using {mode}",
                params.mode
            );
        }
        Ok(text_result(message))
    }
}

/// Change the local server address
#[macros::mcp_tool(
    name = "set_local_url",
    title = "Set Local URL",
    description = "Point the local source at another DevDocs server, e.g. http://localhost:9292. Its availability is checked again on next use.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = false,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct SetLocalUrlTool {
    /// Local server address
    #[json_schema(
        title = "URL",
        description = "Base URL of the local DevDocs server"
    )]
    pub url: String,
}

pub struct SetLocalUrlToolImpl {
    service: Arc<DocService>,
}

impl SetLocalUrlToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for SetLocalUrlToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        SetLocalUrlTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: SetLocalUrlTool = parse_arguments("set_local_url", arguments)?;

        let parsed = url::Url::parse(params.url.trim()).map_err(|e| {
            CallToolError::invalid_arguments("set_local_url", Some(format!("Invalid URL: {e}")))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CallToolError::invalid_arguments(
                "set_local_url",
                Some("URL must use http or https".to_string()),
            ));
        }

        let resolver = self.service.resolver();
        let previous = resolver.local_url();
        resolver.set_local_url(params.url.trim());

        Ok(text_result(format!(
            "Local source: {previous} -> {}\nAvailability will be checked on next use.",
            resolver.local_url()
        )))
    }
}
