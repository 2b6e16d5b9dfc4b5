//! Page tools
#![allow(missing_docs)]

use super::DocService;
use crate::tools::{parse_arguments, source_note, text_result, tool_error, Tool};
use crate::utils::string::truncate_at_word;
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

/// Longest single page returned, in characters
pub const MAX_PAGE_CHARS: usize = 50_000;

/// Longest page returned inside a multi-page reply, in characters
pub const MAX_MULTI_PAGE_CHARS: usize = 3_000;

const MAX_PATHS: usize = 20;

/// Read one page
#[macros::mcp_tool(
    name = "get_page_content",
    title = "Page Content",
    description = "Read one documentation page as Markdown. Needs the exact page path, as returned by search_documentation. A #fragment is ignored.",
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
pub struct GetPageContentTool {
    /// Technology slug
    #[json_schema(title = "Technology", description = "Technology slug")]
    pub tech: String,

    /// Page path
    #[json_schema(
        title = "Path",
        description = "Page path, e.g. library/asyncio or global_objects/promise"
    )]
    pub path: String,

    /// Bypass the cache
    #[json_schema(
        title = "Force refresh",
        description = "Fetch a fresh page instead of using the cached one",
        default = false
    )]
    pub force_refresh: Option<bool>,
}

pub struct GetPageContentToolImpl {
    service: Arc<DocService>,
}

impl GetPageContentToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetPageContentToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetPageContentTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: GetPageContentTool = parse_arguments("get_page_content", arguments)?;

        let page = self
            .service
            .page(
                &params.tech,
                &params.path,
                params.force_refresh.unwrap_or(false),
            )
            .await
            .map_err(|e| {
                CallToolError::from_message(format!(
                    "Failed to get {}/{}: {e}",
                    params.tech, params.path
                ))
            })?;

        let mut content = truncate_at_word(&page.markdown, MAX_PAGE_CHARS);
        content.push_str(&source_note(page.source));
        Ok(text_result(content))
    }
}

/// Read several pages
#[macros::mcp_tool(
    name = "get_multiple_pages",
    title = "Multiple Pages",
    description = "Read several pages of one documentation set in a single call. Each page is reported on its own; long pages are shortened.",
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
pub struct GetMultiplePagesTool {
    /// Technology slug
    #[json_schema(title = "Technology", description = "Technology slug")]
    pub tech: String,

    /// Page paths
    #[json_schema(
        title = "Paths",
        description = "Page paths to read, at most 20"
    )]
    pub paths: Vec<String>,
}

pub struct GetMultiplePagesToolImpl {
    service: Arc<DocService>,
}

impl GetMultiplePagesToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetMultiplePagesToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetMultiplePagesTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: GetMultiplePagesTool = parse_arguments("get_multiple_pages", arguments)?;
        if params.paths.is_empty() {
            return Err(CallToolError::invalid_arguments(
                "get_multiple_pages",
                Some("paths must name at least one page".to_string()),
            ));
        }
        if params.paths.len() > MAX_PATHS {
            return Err(CallToolError::invalid_arguments(
                "get_multiple_pages",
                Some(format!("at most {MAX_PATHS} paths per call")),
            ));
        }

        let report = self
            .service
            .multiple_pages(&params.tech, &params.paths)
            .await;

        let mut output = format!("## Pages of {}\n\n", params.tech);
        let _ = writeln!(
            output,
            "Requested: {} | Successful: {} | Failed: {}",
            params.paths.len(),
            report.successful(),
            report.failed()
        );

        for (path, outcome) in &report.pages {
            match outcome {
                Ok(page) => {
                    let _ = writeln!(output, "\n### {path} ({})\n", page.source);
                    output.push_str(&truncate_at_word(&page.markdown, MAX_MULTI_PAGE_CHARS));
                    output.push('\n');
                }
                Err(e) => {
                    let _ = writeln!(output, "\n### {path} (failed)\n\nError: {e}");
                }
            }
        }

        Ok(text_result(output))
    }
}

/// Code examples of a page
#[macros::mcp_tool(
    name = "get_examples",
    title = "Code Examples",
    description = "Extract only the code blocks of a documentation page, with their language.",
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
pub struct GetExamplesTool {
    /// Technology slug
    #[json_schema(title = "Technology", description = "Technology slug")]
    pub tech: String,

    /// Page path
    #[json_schema(title = "Path", description = "Page path")]
    pub path: String,
}

pub struct GetExamplesToolImpl {
    service: Arc<DocService>,
}

impl GetExamplesToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetExamplesToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetExamplesTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: GetExamplesTool = parse_arguments("get_examples", arguments)?;

        let examples = self
            .service
            .examples(&params.tech, &params.path)
            .await
            .map_err(|e| tool_error(&e))?;

        let mut output = format!(
            "## Code examples: {}\n\nFound: {} code blocks\n",
            params.path,
            examples.value.len()
        );

        if examples.value.is_empty() {
            output.push_str("\n_No code examples on this page_");
        }

        for (i, example) in examples.value.iter().enumerate() {
            let _ = write!(
                output,
                "\n### Example {}\n```{}\n{}\n```\n",
                i + 1,
                example.language,
                example.code
            );
        }
        output.push_str(&source_note(examples.source));

        Ok(text_result(output))
    }
}

/// Export a documentation set
#[macros::mcp_tool(
    name = "export_documentation",
    title = "Export Documentation",
    description = "Write the pages of a documentation set as Markdown files into a local directory. Large sets take minutes; use max_pages to limit the export.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = false,
    execution(task_support = "optional"),
    icons = [
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "light"),
        (src = "https://devdocs.io/favicon.ico", mime_type = "image/x-icon", sizes = ["32x32"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct ExportDocumentationTool {
    /// Technology slug
    #[json_schema(title = "Technology", description = "Technology slug")]
    pub tech: String,

    /// Output directory
    #[json_schema(
        title = "Output directory",
        description = "Directory the Markdown files are written to; created if missing"
    )]
    pub output_dir: String,

    /// Page limit
    #[json_schema(
        title = "Maximum pages",
        description = "Maximum number of pages to export (optional, all when omitted)",
        minimum = 1
    )]
    pub max_pages: Option<u32>,
}

pub struct ExportDocumentationToolImpl {
    service: Arc<DocService>,
}

impl ExportDocumentationToolImpl {
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ExportDocumentationToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ExportDocumentationTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: ExportDocumentationTool = parse_arguments("export_documentation", arguments)?;
        if params.output_dir.trim().is_empty() {
            return Err(CallToolError::invalid_arguments(
                "export_documentation",
                Some("output_dir cannot be empty".to_string()),
            ));
        }

        let report = self
            .service
            .export(
                &params.tech,
                Path::new(&params.output_dir),
                params.max_pages.map(|max| max as usize),
            )
            .await
            .map_err(|e| tool_error(&e))?;

        #[allow(clippy::cast_precision_loss)]
        let size_mb = report.total_size_bytes as f64 / 1024.0 / 1024.0;
        let output = format!(
            "## Export finished: {}\n\n- **Directory:** `{}`\n- **Pages in index:** {}\n- **Pages exported:** {}\n- **Errors:** {}\n- **Total size:** {:.2} MB",
            report.technology,
            report.output_dir.display(),
            report.total_pages,
            report.exported,
            report.failed,
            size_mb
        );

        Ok(text_result(output))
    }
}
