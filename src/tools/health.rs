//! Source status tool
#![allow(missing_docs)]

use crate::resolver::{Mode, ResolverStatus};
use crate::tools::docs::DocService;
use crate::tools::{parse_arguments, text_result, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

/// Source status tool parameters
#[macros::mcp_tool(
    name = "source_status",
    title = "Source Status",
    description = "Check the documentation sources: local DevDocs server, public devdocs.io and the cache, plus the active source mode and the source of the last answer. Use it to diagnose connectivity problems.",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = true,
    read_only_hint = true,
    execution(task_support = "optional"),
    icons = [
        (src = "https://img.icons8.com/color/96/000000/heart-health.png", mime_type = "image/png", sizes = ["96x96"], theme = "light"),
        (src = "https://img.icons8.com/color/96/000000/heart-health.png", mime_type = "image/png", sizes = ["96x96"], theme = "dark")
    ]
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct SourceStatusTool {
    /// Verbose output
    #[json_schema(
        title = "Verbose",
        description = "Return the full report as JSON, including check durations",
        default = false
    )]
    pub verbose: Option<bool>,
}

/// Overall report
#[derive(Debug, Clone, Serialize)]
struct SourceReport {
    status: String,
    timestamp: String,
    resolver: ResolverStatus,
    checks: Vec<SourceCheck>,
    uptime_secs: u64,
}

/// One source check
#[derive(Debug, Clone, Serialize)]
struct SourceCheck {
    name: String,
    status: String,
    duration_ms: u64,
    message: Option<String>,
}

impl SourceCheck {
    #[allow(clippy::cast_possible_truncation)]
    fn new(name: &str, status: &str, started: Instant, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            message,
        }
    }
}

/// Source status tool implementation
pub struct SourceStatusToolImpl {
    service: Arc<DocService>,
    start_time: Instant,
}

impl SourceStatusToolImpl {
    /// Create a new source status tool
    #[must_use]
    pub fn new(service: Arc<DocService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }

    fn check_local(resolver: &ResolverStatus) -> SourceCheck {
        let started = Instant::now();
        match resolver.local_available {
            Some(true) => SourceCheck::new(
                "local",
                "healthy",
                started,
                Some(format!("{} is reachable", resolver.local_url)),
            ),
            Some(false) => SourceCheck::new(
                "local",
                "unhealthy",
                started,
                Some(format!("{} is not reachable", resolver.local_url)),
            ),
            None => SourceCheck::new(
                "local",
                "skipped",
                started,
                Some("not probed in offline mode".to_string()),
            ),
        }
    }

    async fn check_remote(&self, mode: Mode) -> SourceCheck {
        let started = Instant::now();
        if mode == Mode::Offline {
            return SourceCheck::new(
                "remote",
                "skipped",
                started,
                Some("not probed in offline mode".to_string()),
            );
        }

        if self.service.resolver().check_remote_available().await {
            SourceCheck::new("remote", "healthy", started, None)
        } else {
            SourceCheck::new(
                "remote",
                "unhealthy",
                started,
                Some("devdocs.io is not reachable".to_string()),
            )
        }
    }

    async fn check_cache(&self) -> SourceCheck {
        let started = Instant::now();
        match self.service.cache_stats().await {
            Ok(stats) => SourceCheck::new(
                "cache",
                "healthy",
                started,
                Some(format!(
                    "{} technologies, {} pages",
                    stats.technologies.len(),
                    stats.total_files
                )),
            ),
            Err(e) => SourceCheck::new("cache", "unhealthy", started, Some(e.to_string())),
        }
    }

    async fn report(&self) -> SourceReport {
        let resolver = self.service.resolver().status().await;
        let checks = vec![
            Self::check_local(&resolver),
            self.check_remote(resolver.mode).await,
            self.check_cache().await,
        ];

        let status = if checks.iter().all(|c| c.status != "unhealthy") {
            "healthy"
        } else if checks.iter().any(|c| c.status == "healthy") {
            "degraded"
        } else {
            "unhealthy"
        };

        SourceReport {
            status: status.to_string(),
            timestamp: crate::utils::time::now_formatted(),
            resolver,
            checks,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

fn format_report(report: &SourceReport) -> String {
    let mut summary = format!(
        "Status: {}\nMode: {}\nLocal URL: {}\nLast source: {}\nUptime: {}s\nTimestamp: {}\n\nChecks:",
        report.status,
        report.resolver.mode,
        report.resolver.local_url,
        report
            .resolver
            .last_source
            .map_or("none", |source| source.as_str()),
        report.uptime_secs,
        report.timestamp
    );

    for check in &report.checks {
        let _ = write!(
            summary,
            "\n- {}: {} ({}ms)",
            check.name, check.status, check.duration_ms
        );
        if let Some(message) = &check.message {
            let _ = write!(summary, " - {message}");
        }
    }

    summary
}

#[async_trait]
impl Tool for SourceStatusToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        SourceStatusTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let params: SourceStatusTool = parse_arguments("source_status", arguments)?;
        let report = self.report().await;

        let content = if params.verbose.unwrap_or(false) {
            serde_json::to_string_pretty(&report).map_err(|e| {
                CallToolError::from_message(format!("JSON serialization failed: {e}"))
            })?
        } else {
            format_report(&report)
        };

        Ok(text_result(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::docs::tests::offline_service;

    #[tokio::test]
    async fn test_offline_status_skips_network() {
        let tool = SourceStatusToolImpl::new(Arc::new(offline_service().await));
        let report = tool.report().await;

        assert_eq!(report.resolver.mode, Mode::Offline);
        assert_eq!(report.status, "healthy");
        assert_eq!(report.checks[0].status, "skipped");
        assert_eq!(report.checks[1].status, "skipped");
        assert_eq!(report.checks[2].status, "healthy");
    }

    #[tokio::test]
    async fn test_unreachable_sources_reported() {
        let service = offline_service().await;
        service.resolver().set_mode(Mode::Auto);
        let tool = SourceStatusToolImpl::new(Arc::new(service));

        let summary = format_report(&tool.report().await);
        assert!(summary.contains("Status: degraded"));
        assert!(summary.contains("local: unhealthy"));
        assert!(summary.contains("remote: unhealthy"));
    }

    #[tokio::test]
    async fn test_verbose_is_json() {
        let tool = SourceStatusToolImpl::new(Arc::new(offline_service().await));
        let result = tool
            .execute(serde_json::json!({"verbose": true}))
            .await
            .unwrap();
        let body = serde_json::to_string(&result).unwrap();
        assert!(body.contains("local_available"));
    }
}
