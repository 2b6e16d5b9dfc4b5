//! DevDocs MCP server binary

use clap::{Parser, Subcommand};
use devdocs_mcp::server::transport::{self, TransportMode};
use devdocs_mcp::{AppConfig, DevDocsServer};
use rust_mcp_sdk::schema::{CallToolResult, ContentBlock};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "devdocs-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "DevDocs documentation MCP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

/// Source overrides shared by commands that resolve documentation
#[derive(clap::Args, Debug, Default)]
struct SourceArgs {
    /// Source mode [auto, local_only, remote_only, offline]
    #[arg(long, env = "DEVDOCS_MODE")]
    mode: Option<String>,

    /// Local DevDocs server address
    #[arg(long, env = "DEVDOCS_LOCAL_URL")]
    local_url: Option<String>,

    /// Cache directory
    #[arg(long, env = "DEVDOCS_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Transport [stdio, http, sse, hybrid]
        #[arg(short, long)]
        transport: Option<String>,

        /// Listen host
        #[arg(long)]
        host: Option<String>,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Write a default configuration file
    Config {
        /// Output file path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run one tool and print its output
    Test {
        /// Tool name, e.g. list_documentations or get_page_content
        #[arg(short, long, default_value = "list_documentations")]
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Check the documentation sources
    Health {
        /// Print the full JSON report
        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            transport,
            host,
            port,
            sources,
        } => {
            let mut config = load_config(&cli.config, &sources)?;
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            if let Some(t) = transport {
                config.server.transport_mode = t;
            }
            config
                .validate()
                .map_err(|e| format!("Invalid configuration: {e}"))?;
            serve_command(config, cli.debug).await?;
        }
        Commands::Config { output, force } => {
            config_command(&output, force)?;
        }
        Commands::Test {
            tool,
            args,
            sources,
        } => {
            let config = load_config(&cli.config, &sources)?;
            init_cli_logging(cli.debug);
            test_command(config, &tool, &args).await?;
        }
        Commands::Health { verbose, sources } => {
            let config = load_config(&cli.config, &sources)?;
            init_cli_logging(cli.debug);
            health_command(config, verbose).await?;
        }
        Commands::Version => {
            version_command();
        }
    }

    Ok(())
}

/// Load the configuration file, then apply environment and command line overrides
fn load_config(
    config_path: &Path,
    sources: &SourceArgs,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let file_config = if config_path.exists() {
        Some(
            AppConfig::from_file(config_path)
                .map_err(|e| format!("Failed to load config file: {e}"))?,
        )
    } else {
        None
    };
    let env_config = AppConfig::from_env().ok();
    let mut config = AppConfig::merge(file_config, env_config);

    if let Some(mode) = &sources.mode {
        config.sources.mode.clone_from(mode);
    }
    if let Some(url) = &sources.local_url {
        config.sources.local_url.clone_from(url);
    }
    if let Some(dir) = &sources.cache_dir {
        config.cache.cache_dir = Some(dir.display().to_string());
    }

    Ok(config)
}

fn init_cli_logging(debug: bool) {
    let logging = devdocs_mcp::config::LoggingConfig {
        level: if debug { "debug" } else { "warn" }.to_string(),
        enable_file: false,
        ..Default::default()
    };
    if let Err(e) = devdocs_mcp::init_logging_with_config(&logging) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

async fn serve_command(config: AppConfig, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut logging = config.logging.clone();
    if debug {
        logging.level = "debug".to_string();
    }
    devdocs_mcp::init_logging_with_config(&logging)
        .map_err(|e| format!("Failed to initialize logging: {e}"))?;

    let transport_mode: TransportMode = config.server.transport_mode.parse()?;
    tracing::info!(
        "Starting DevDocs MCP server v{} (transport: {}, source mode: {}, local: {})",
        env!("CARGO_PKG_VERSION"),
        transport_mode,
        config.sources.mode(),
        config.sources.local_url
    );

    let server =
        DevDocsServer::new(config).map_err(|e| format!("Failed to create server: {e}"))?;

    transport::run_server_with_mode(&server, transport_mode)
        .await
        .map_err(|e| format!("{transport_mode} server failed: {e}"))?;

    Ok(())
}

fn config_command(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!(
            "Config file already exists: {}, use --force to overwrite",
            output.display()
        )
        .into());
    }

    AppConfig::default()
        .save_to_file(output)
        .map_err(|e| format!("Failed to save config file: {e}"))?;

    println!("Config file written: {}", output.display());
    Ok(())
}

fn print_result(result: &CallToolResult) {
    for content in &result.content {
        match content {
            ContentBlock::TextContent(text) => println!("{}", text.text),
            other => println!("{other:?}"),
        }
    }
}

async fn test_command(
    config: AppConfig,
    tool: &str,
    args: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let arguments: serde_json::Value =
        serde_json::from_str(args).map_err(|e| format!("--args is not valid JSON: {e}"))?;

    let server = DevDocsServer::new(config)?;
    match server.tool_registry().execute_tool(tool, arguments).await {
        Ok(result) => {
            print_result(&result);
            Ok(())
        }
        Err(e) => Err(format!("Tool {tool} failed: {e}").into()),
    }
}

async fn health_command(config: AppConfig, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let server = DevDocsServer::new(config)?;
    let result = server
        .tool_registry()
        .execute_tool("source_status", serde_json::json!({ "verbose": verbose }))
        .await
        .map_err(|e| format!("Status check failed: {e}"))?;
    print_result(&result);
    Ok(())
}

fn version_command() {
    println!("DevDocs MCP server v{}", env!("CARGO_PKG_VERSION"));
    println!("Build time: {}", env!("BUILD_TIMESTAMP"));
    println!("Git commit: {}", env!("GIT_COMMIT"));
    println!("Rust version: {}", env!("RUST_VERSION"));
}
