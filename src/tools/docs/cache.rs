//! Cache inspection tools
#![allow(missing_docs)]

use super::DocService;
use crate::cache::CacheStats;
use crate::tools::{parse_arguments, text_result, tool_error, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

#[allow(clippy::cast_precision_loss)]
fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Cache statistics
#[macros::mcp_tool(
    name = "get_cache_stats",
    title = "Cache Statistics",
    description = "Show the local cache: directory, file count, total size and cached documentation sets.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetCacheStatsTool {}

pub struct GetCacheStatsToolImpl {
    service: Arc<DocService>,
}

impl GetCacheStatsToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

fn format_cache_stats(stats: &CacheStats) -> String {
    let mut output = String::from("## Cache Statistics\n\n");
    let _ = writeln!(output, "- **Directory:** `{}`", stats.cache_dir);
    let _ = writeln!(output, "- **Total files:** {}", stats.total_files);
    let _ = writeln!(
        output,
        "- **Total size:** {:.2} MB",
        megabytes(stats.total_size_bytes)
    );
    output.push_str("\n### Cached documentation\n\n");

    if stats.technologies.is_empty() {
        output.push_str("_Nothing cached yet_");
    }
    for (technology, tech) in &stats.technologies {
        let _ = writeln!(
            output,
            "- **{technology}**: {} files ({:.2} MB)",
            tech.files,
            megabytes(tech.size_bytes)
        );
    }

    output
}

#[async_trait]
impl Tool for GetCacheStatsToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetCacheStatsTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let _params: GetCacheStatsTool = parse_arguments("get_cache_stats", arguments)?;
        let stats = self
            .service
            .cache_stats()
            .await
            .map_err(|e| tool_error(&e))?;
        Ok(text_result(format_cache_stats(&stats)))
    }
}

/// Clear the cache
#[macros::mcp_tool(
    name = "clear_cache",
    title = "Clear Cache",
    description = "Delete cached documentation. Without tech the whole cache is cleared; with tech only that documentation set.",
    destructive_hint = true,
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
pub struct ClearCacheTool {
    /// Technology slug
    #[json_schema(
        title = "Technology",
        description = "Technology to clear (optional, everything when omitted)"
    )]
    pub tech: Option<String>,
}

pub struct ClearCacheToolImpl {
    service: Arc<DocService>,
}

impl ClearCacheToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ClearCacheToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ClearCacheTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: ClearCacheTool = parse_arguments("clear_cache", arguments)?;
        let outcome = self
            .service
            .clear_cache(params.tech.as_deref())
            .await
            .map_err(|e| tool_error(&e))?;

        let message = match (params.tech, outcome.found) {
            (None, _) => "Cache cleared completely".to_string(),
            (Some(_), true) => format!("Cache of '{}' cleared", outcome.cleared),
            (Some(_), false) => format!("No cache found for '{}'", outcome.cleared),
        };
        Ok(text_result(message))
    }
}

/// Offline availability
#[macros::mcp_tool(
    name = "offline_mode_status",
    title = "Offline Status",
    description = "Show which documentation sets can be read without network access: cached index, page count and size per set.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct OfflineModeStatusTool {}

pub struct OfflineModeStatusToolImpl {
    service: Arc<DocService>,
}

impl OfflineModeStatusToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

fn format_offline_status(stats: &CacheStats, mode: crate::resolver::Mode) -> String {
    let mut output = String::from("## Offline Status\n\n");
    let _ = writeln!(output, "- **Source mode:** {mode}");
    let _ = writeln!(output, "- **Cache directory:** `{}`", stats.cache_dir);
    let _ = writeln!(
        output,
        "- **Available offline:** {} documentation sets",
        stats.technologies.len()
    );
    let _ = writeln!(
        output,
        "- **Catalog cached:** {}",
        if stats.docs_list_cached { "yes" } else { "no" }
    );
    let _ = writeln!(
        output,
        "- **Total size:** {:.2} MB",
        megabytes(stats.total_size_bytes)
    );

    if stats.technologies.is_empty() {
        output.push_str(
            "\n_Nothing cached. Reading pages or indexes with get_page_content or get_documentation_index caches them._",
        );
        return output;
    }

    output.push_str("\n### Cached documentation\n\n");
    for (technology, tech) in &stats.technologies {
        let _ = writeln!(
            output,
            "- **{technology}**: {} pages ({:.2} MB) | index: {}",
            tech.files,
            megabytes(tech.size_bytes),
            if tech.has_index { "yes" } else { "no" }
        );
    }

    output
}

#[async_trait]
impl Tool for OfflineModeStatusToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        OfflineModeStatusTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let _params: OfflineModeStatusTool = parse_arguments("offline_mode_status", arguments)?;
        let stats = self
            .service
            .offline_status()
            .await
            .map_err(|e| tool_error(&e))?;
        Ok(text_result(format_offline_status(
            &stats,
            self.service.resolver().mode(),
        )))
    }
}
