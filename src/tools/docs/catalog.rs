//! Catalog and index tools
#![allow(missing_docs)]

use super::{DocService, IndexEntry};
use crate::resolver::normalize_path;
use crate::tools::{parse_arguments, source_note, text_result, tool_error, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

const MAX_LISTED_DOCS: usize = 50;
const MAX_LISTED_TYPES: usize = 10;

/// List documentation sets
#[macros::mcp_tool(
    name = "list_documentations",
    title = "List Documentations",
    description = "List every documentation set available in DevDocs, optionally filtered by name or slug. The slug is what every other tool expects, e.g. python~3.12 or react.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListDocumentationsTool {
    /// Name filter
    #[json_schema(
        title = "Filter",
        description = "Optional case-insensitive filter on name or slug, e.g. python, javascript, spring"
    )]
    pub filter: Option<String>,

    /// Bypass the cache
    #[json_schema(
        title = "Force refresh",
        description = "Fetch a fresh catalog instead of using the cached one",
        default = false
    )]
    pub force_refresh: Option<bool>,

    /// Output format
    #[json_schema(
        title = "Output format",
        description = "markdown (default) or json",
        default = "markdown"
    )]
    pub format: Option<String>,
}

pub struct ListDocumentationsToolImpl {
    service: Arc<DocService>,
}

impl ListDocumentationsToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListDocumentationsToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ListDocumentationsTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: ListDocumentationsTool = parse_arguments("list_documentations", arguments)?;
        let filter = params.filter.filter(|f| !f.trim().is_empty());

        let docs = match &filter {
            Some(filter) => self.service.search_docs(filter).await,
            None => {
                self.service
                    .docs_list(params.force_refresh.unwrap_or(false))
                    .await
            }
        }
        .map_err(|e| tool_error(&e))?;

        if params.format.as_deref() == Some("json") {
            let json = serde_json::to_string_pretty(&docs.value).map_err(|e| {
                CallToolError::from_message(format!("JSON serialization failed: {e}"))
            })?;
            return Ok(text_result(json));
        }

        if docs.value.is_empty() {
            let suffix = filter.map(|f| format!(" matching '{f}'")).unwrap_or_default();
            return Ok(text_result(format!("No documentation found{suffix}")));
        }

        let mut output = format!(
            "## Available Documentation ({} found)\n\n",
            docs.value.len()
        );
        for doc in docs.value.iter().take(MAX_LISTED_DOCS) {
            let _ = write!(output, "- **{}** (`{}`)", doc.name, doc.slug);
            if let Some(version) = doc.version_label() {
                let _ = write!(output, " - v{version}");
            }
            output.push('\n');
        }
        if docs.value.len() > MAX_LISTED_DOCS {
            let _ = writeln!(
                output,
                "\n... and {} more. Use a filter to narrow the list.",
                docs.value.len() - MAX_LISTED_DOCS
            );
        }
        output.push_str("\nUse the slug with the other tools, e.g. `python~3.12`.");
        output.push_str(&source_note(docs.source));

        Ok(text_result(output))
    }
}

/// Search one technology index
#[macros::mcp_tool(
    name = "search_documentation",
    title = "Search Documentation",
    description = "Search the index of one documentation set for classes, functions, methods, modules and guides. Matches entry names and page paths. Use list_documentations to find the slug.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct SearchDocumentationTool {
    /// Technology slug
    #[json_schema(
        title = "Technology",
        description = "Technology slug, e.g. python~3.12, javascript, spring_boot"
    )]
    pub tech: String,

    /// Search query
    #[json_schema(title = "Query", description = "Search term, e.g. asyncio or Promise")]
    pub query: String,

    /// Result limit
    #[json_schema(
        title = "Limit",
        description = "Maximum number of results, 1-200",
        minimum = 1,
        maximum = 200,
        default = 20
    )]
    pub limit: Option<u32>,

    /// Output format
    #[json_schema(
        title = "Output format",
        description = "markdown (default) or json",
        default = "markdown"
    )]
    pub format: Option<String>,
}

pub struct SearchDocumentationToolImpl {
    service: Arc<DocService>,
}

impl SearchDocumentationToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for SearchDocumentationToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        SearchDocumentationTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: SearchDocumentationTool = parse_arguments("search_documentation", arguments)?;
        let limit = params.limit.unwrap_or(20).clamp(1, 200) as usize;

        let hits = self
            .service
            .search_in_index(&params.tech, &params.query, limit)
            .await
            .map_err(|e| {
                CallToolError::from_message(format!(
                    "Search in {} failed: {e}. Check the slug with list_documentations.",
                    params.tech
                ))
            })?;

        if params.format.as_deref() == Some("json") {
            let json = serde_json::to_string_pretty(&hits.value).map_err(|e| {
                CallToolError::from_message(format!("JSON serialization failed: {e}"))
            })?;
            return Ok(text_result(json));
        }

        if hits.value.is_empty() {
            return Ok(text_result(format!(
                "No results for '{}' in {}",
                params.query, params.tech
            )));
        }

        let mut output = format!(
            "## Results for '{}' in {} ({} found)\n\n",
            params.query,
            params.tech,
            hits.value.len()
        );
        for entry in &hits.value {
            let _ = writeln!(output, "- **{}**", entry.name);
            let _ = writeln!(output, "  - Path: `{}`", normalize_path(&entry.path));
            if !entry.entry_type.is_empty() {
                let _ = writeln!(output, "  - Type: {}", entry.entry_type);
            }
        }
        let _ = write!(
            output,
            "\nUse `get_page_content` with tech `{}` and one of these paths to read a page.",
            params.tech
        );
        output.push_str(&source_note(hits.source));

        Ok(text_result(output))
    }
}

/// Index statistics
#[macros::mcp_tool(
    name = "get_documentation_index",
    title = "Documentation Index",
    description = "Show the structure of a documentation set: total entries, distinct pages and entry types. Useful before searching.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetDocumentationIndexTool {
    /// Technology slug
    #[json_schema(title = "Technology", description = "Technology slug")]
    pub tech: String,

    /// Bypass the cache
    #[json_schema(
        title = "Force refresh",
        description = "Fetch a fresh index instead of using the cached one",
        default = false
    )]
    pub force_refresh: Option<bool>,
}

pub struct GetDocumentationIndexToolImpl {
    service: Arc<DocService>,
}

impl GetDocumentationIndexToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetDocumentationIndexToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetDocumentationIndexTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: GetDocumentationIndexTool =
            parse_arguments("get_documentation_index", arguments)?;

        if params.force_refresh.unwrap_or(false) {
            self.service
                .index(&params.tech, true)
                .await
                .map_err(|e| tool_error(&e))?;
        }

        let stats = self
            .service
            .index_stats(&params.tech)
            .await
            .map_err(|e| tool_error(&e))?;

        let mut output = format!("## Index of {}\n\n", params.tech);
        let _ = writeln!(output, "- **Total entries:** {}", stats.value.total_entries);
        let _ = writeln!(output, "- **Unique pages:** {}", stats.value.unique_pages);
        let shown: Vec<&str> = stats
            .value
            .types
            .iter()
            .take(MAX_LISTED_TYPES)
            .map(String::as_str)
            .collect();
        let _ = writeln!(output, "- **Content types:** {}", shown.join(", "));
        if stats.value.types.len() > MAX_LISTED_TYPES {
            let _ = writeln!(
                output,
                "  ... and {} more",
                stats.value.types.len() - MAX_LISTED_TYPES
            );
        }
        output.push_str(&source_note(stats.source));

        Ok(text_result(output))
    }
}

/// Entries of one type
#[macros::mcp_tool(
    name = "get_type_entries",
    title = "Entries By Type",
    description = "List the entries of one type (class, function, method, module, hook...) in a documentation set. When nothing matches, the available types are listed.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetTypeEntriesTool {
    /// Technology slug
    #[json_schema(title = "Technology", description = "Technology slug")]
    pub tech: String,

    /// Entry type
    #[json_schema(
        title = "Entry type",
        description = "Type to filter on, matched case-insensitively as a substring"
    )]
    pub entry_type: String,

    /// Result limit
    #[json_schema(
        title = "Limit",
        description = "Maximum number of entries, 1-500",
        minimum = 1,
        maximum = 500,
        default = 50
    )]
    pub limit: Option<u32>,
}

pub struct GetTypeEntriesToolImpl {
    service: Arc<DocService>,
}

impl GetTypeEntriesToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetTypeEntriesToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetTypeEntriesTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: GetTypeEntriesTool = parse_arguments("get_type_entries", arguments)?;
        if params.entry_type.trim().is_empty() {
            return Err(CallToolError::invalid_arguments(
                "get_type_entries",
                Some("entry_type cannot be empty".to_string()),
            ));
        }
        let limit = params.limit.unwrap_or(50).clamp(1, 500) as usize;

        let result = self
            .service
            .type_entries(&params.tech, &params.entry_type, limit)
            .await
            .map_err(|e| tool_error(&e))?;
        let found = &result.value;

        let mut output = format!(
            "## Entries of type '{}' in {}\n\nFound: {}\n\n",
            params.entry_type,
            params.tech,
            found.entries.len()
        );

        if found.entries.is_empty() {
            let available: Vec<&str> = found
                .available_types
                .iter()
                .take(20)
                .map(String::as_str)
                .collect();
            let _ = write!(
                output,
                "No entries of type '{}'.",
                params.entry_type
            );
            if !available.is_empty() {
                let _ = write!(output, "\n\n**Available types:** {}", available.join(", "));
            }
            return Ok(text_result(output));
        }

        for entry in &found.entries {
            let _ = writeln!(output, "- **{}** -> `{}`", entry.name, entry.path);
        }
        if found.entries.len() >= limit {
            let _ = write!(
                output,
                "\n_Showing {limit} results. Raise `limit` to see more._"
            );
        }
        output.push_str(&source_note(result.source));

        Ok(text_result(output))
    }
}

/// Search several technologies
#[macros::mcp_tool(
    name = "search_across_docs",
    title = "Search Across Docs",
    description = "Search a term in several documentation sets at once. Without techs, searches javascript, python~3.12, react, node, typescript, html, css, vue~3 and angular.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct SearchAcrossDocsTool {
    /// Search query
    #[json_schema(title = "Query", description = "Search term")]
    pub query: String,

    /// Technologies to search
    #[json_schema(
        title = "Technologies",
        description = "Technology slugs to search (optional)"
    )]
    pub techs: Option<Vec<String>>,

    /// Per-technology limit
    #[json_schema(
        title = "Limit per technology",
        description = "Maximum results per technology, 1-50",
        minimum = 1,
        maximum = 50,
        default = 5
    )]
    pub limit_per_tech: Option<u32>,
}

pub struct SearchAcrossDocsToolImpl {
    service: Arc<DocService>,
}

impl SearchAcrossDocsToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

fn format_hit(output: &mut String, entry: &IndexEntry) {
    let _ = write!(output, "- **{}**", entry.name);
    if !entry.entry_type.is_empty() {
        let _ = write!(output, " [{}]", entry.entry_type);
    }
    let _ = writeln!(output, " -> `{}`", entry.path);
}

#[async_trait]
impl Tool for SearchAcrossDocsToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        SearchAcrossDocsTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: SearchAcrossDocsTool = parse_arguments("search_across_docs", arguments)?;
        let limit = params.limit_per_tech.unwrap_or(5).clamp(1, 50) as usize;

        let report = self
            .service
            .search_across(&params.query, params.techs.as_deref(), limit)
            .await
            .map_err(|e| tool_error(&e))?;

        let mut output = format!("## Search: '{}'\n\n", params.query);
        let _ = writeln!(
            output,
            "Technologies searched: {} | Total results: {}",
            report.searched_count(),
            report.total_results()
        );

        for hits in &report.results {
            match &hits.outcome {
                Err(e) => {
                    let _ = writeln!(output, "\n### {}: error - {e}", hits.technology);
                }
                Ok(entries) if !entries.is_empty() => {
                    let _ = writeln!(
                        output,
                        "\n### {} ({} results)",
                        hits.technology,
                        entries.len()
                    );
                    for entry in entries {
                        format_hit(&mut output, entry);
                    }
                }
                Ok(_) => {}
            }
        }

        if report.total_results() == 0 {
            output.push_str("\n_No results found_");
        }

        Ok(text_result(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::docs::tests::offline_service;

    fn text(result: &CallToolResult) -> String {
        serde_json::to_string(result).unwrap()
    }

    #[tokio::test]
    async fn test_list_documentations_filter() {
        let tool = ListDocumentationsToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"filter": "react"}))
            .await
            .unwrap();
        let body = text(&result);
        assert!(body.contains("React"));
        assert!(body.contains("v18.2.0"));
        assert!(!body.contains("**Python**"));
        assert!(body.contains("_Source: cache_"));
    }

    #[tokio::test]
    async fn test_list_documentations_json() {
        let tool = ListDocumentationsToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"format": "json"}))
            .await
            .unwrap();
        assert!(text(&result).contains("javascript"));
    }

    #[tokio::test]
    async fn test_search_documentation_strips_fragment_in_output() {
        let tool = SearchDocumentationToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"tech": "python~3.12", "query": "asyncio.run"}))
            .await
            .unwrap();
        let body = text(&result);
        assert!(body.contains("library/asyncio-runner"));
        assert!(!body.contains("#asyncio.run`"));
    }

    #[tokio::test]
    async fn test_search_documentation_missing_tech() {
        let tool = SearchDocumentationToolImpl::new(Arc::new(offline_service().await));
        assert!(tool
            .execute(serde_json::json!({"tech": "rust", "query": "vec"}))
            .await
            .is_err());
        assert!(tool
            .execute(serde_json::json!({"query": "vec"}))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_get_documentation_index() {
        let tool = GetDocumentationIndexToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"tech": "python~3.12"}))
            .await
            .unwrap();
        let body = text(&result);
        assert!(body.contains("Total entries:** 5"));
        assert!(body.contains("Networking, File Formats, Class"));
    }

    #[tokio::test]
    async fn test_get_type_entries_lists_available_types() {
        let tool = GetTypeEntriesToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"tech": "python~3.12", "entry_type": "hook"}))
            .await
            .unwrap();
        assert!(text(&result).contains("Available types"));
    }

    #[tokio::test]
    async fn test_search_across_reports_per_tech_errors() {
        let tool = SearchAcrossDocsToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"query": "path", "techs": ["python~3.12", "go"]}))
            .await
            .unwrap();
        let body = text(&result);
        assert!(body.contains("python~3.12 ("));
        assert!(body.contains("go: error"));
    }
}
