//! DevDocs MCP Server
//!
//! Serves DevDocs documentation to MCP clients. Content is resolved from a
//! local DevDocs instance, an on-disk cache or the public devdocs.io service,
//! depending on the active source mode.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cache;
pub mod config;
pub mod error;
pub mod resolver;
pub mod server;
pub mod source;
pub mod tools;
pub mod utils;

/// Re-export common types
pub use crate::config::AppConfig;
pub use crate::error::{Error, Result};
pub use crate::resolver::{Mode, Resolver};
pub use crate::server::DevDocsServer;

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name
pub const NAME: &str = "devdocs-mcp";

fn rolling_file_writer(
    file_path: &str,
) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let path = std::path::Path::new(file_path);
    let log_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let log_file_name = path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("devdocs-mcp.log"));

    std::fs::create_dir_all(log_dir).map_err(|e| {
        error::Error::Initialization(format!("Failed to create log directory: {e}"))
    })?;

    Ok(tracing_appender::rolling::daily(log_dir, log_file_name))
}

/// Initialize logging system with configuration
///
/// Console output goes to stderr so that it never mixes with the stdio
/// transport on stdout.
///
/// # Errors
/// Returns an error if logging system initialization fails
pub fn init_logging_with_config(config: &crate::config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match config.level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::new(level);

    let console_layer = || {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(true)
            .compact()
    };

    match (config.enable_console, config.enable_file, &config.file_path) {
        (true, true, Some(file_path)) => {
            let file_appender = rolling_file_writer(file_path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer())
                .with(
                    fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .compact(),
                )
                .try_init()
                .map_err(|e| error::Error::Initialization(e.to_string()))?;
        }

        (false, true, Some(file_path)) => {
            let file_appender = rolling_file_writer(file_path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .compact(),
                )
                .try_init()
                .map_err(|e| error::Error::Initialization(e.to_string()))?;
        }

        // Console only, or file logging without a path
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer())
                .try_init()
                .map_err(|e| error::Error::Initialization(e.to_string()))?;
        }
    }

    Ok(())
}
