//! Configuration module

use crate::cache::CacheConfig;
use crate::error::Error;
use crate::resolver::Mode;
use crate::source::DEFAULT_LOCAL_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Documentation source configuration
    pub sources: SourcesConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name
    pub name: String,

    /// Server version
    pub version: String,

    /// Server description
    pub description: Option<String>,

    /// Host address
    pub host: String,

    /// Port
    pub port: u16,

    /// Transport mode: stdio, http, sse or hybrid
    pub transport_mode: String,

    /// Enable SSE support
    pub enable_sse: bool,
}

/// Documentation source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Operating mode; unknown values mean `auto`
    pub mode: String,

    /// Address of the local DevDocs instance
    pub local_url: String,

    /// Local request timeout (seconds)
    pub local_timeout_secs: u64,

    /// Remote request timeout (seconds)
    pub remote_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log file path
    pub file_path: Option<String>,

    /// Whether console logging is enabled (written to stderr)
    pub enable_console: bool,

    /// Whether file logging is enabled
    pub enable_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: crate::NAME.to_string(),
            version: crate::VERSION.to_string(),
            description: Some(
                "DevDocs documentation MCP server with local, cached and remote sources"
                    .to_string(),
            ),
            host: "127.0.0.1".to_string(),
            port: 8080,
            transport_mode: "stdio".to_string(),
            enable_sse: true,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Auto.to_string(),
            local_url: DEFAULT_LOCAL_URL.to_string(),
            local_timeout_secs: 5,
            remote_timeout_secs: 60,
        }
    }
}

impl SourcesConfig {
    /// Parsed mode, `auto` when the configured value is unknown
    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::parse_or_default(&self.mode)
    }

    /// Local request timeout
    #[must_use]
    pub fn local_timeout(&self) -> Duration {
        Duration::from_secs(self.local_timeout_secs)
    }

    /// Remote request timeout
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: Some("./logs/devdocs-mcp.log".to_string()),
            enable_console: true,
            enable_file: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed or fails validation
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, directory creation or the write fails
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::Config(format!("Failed to create directory: {e}")))?;
            }
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// The source mode is never rejected; unknown values fall back to `auto`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty host, zero port, unknown transport or log
    /// level, a malformed local URL, zero timeouts or an unknown cache type
    pub fn validate(&self) -> Result<(), Error> {
        if self.server.host.is_empty() {
            return Err(Error::Config("Server host cannot be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(Error::Config("Server port cannot be 0".to_string()));
        }

        let valid_modes = ["stdio", "http", "sse", "hybrid"];
        if !valid_modes.contains(&self.server.transport_mode.as_str()) {
            return Err(Error::Config(format!(
                "Invalid transport mode: {}, valid values: {:?}",
                self.server.transport_mode, valid_modes
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level: {}, valid values: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let local = url::Url::parse(&self.sources.local_url)
            .map_err(|e| Error::Config(format!("Invalid local URL: {e}")))?;
        if !matches!(local.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Local URL must use http or https: {}",
                self.sources.local_url
            )));
        }

        if self.sources.local_timeout_secs == 0 || self.sources.remote_timeout_secs == 0 {
            return Err(Error::Config("Source timeouts cannot be 0".to_string()));
        }

        let valid_caches = ["disk", "memory"];
        if !valid_caches.contains(&self.cache.cache_type.as_str()) {
            return Err(Error::Config(format!(
                "Invalid cache type: {}, valid values: {:?}",
                self.cache.cache_type, valid_caches
            )));
        }

        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or validation fails
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("DEVDOCS_NAME") {
            config.server.name = name;
        }

        if let Ok(host) = std::env::var("DEVDOCS_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("DEVDOCS_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid port: {e}")))?;
        }

        if let Ok(mode) = std::env::var("DEVDOCS_TRANSPORT_MODE") {
            config.server.transport_mode = mode;
        }

        if let Ok(level) = std::env::var("DEVDOCS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(local_url) = std::env::var("DEVDOCS_LOCAL_URL") {
            config.sources.local_url = local_url;
        }

        if let Ok(mode) = std::env::var("DEVDOCS_MODE") {
            config.sources.mode = mode;
        }

        if let Ok(dir) = std::env::var("DEVDOCS_CACHE_DIR") {
            config.cache.cache_dir = Some(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge configurations; environment values win over file values
    #[must_use]
    pub fn merge(file_config: Option<Self>, env_config: Option<Self>) -> Self {
        let mut config = file_config.unwrap_or_default();

        if let Some(env) = env_config {
            let defaults = Self::default();

            if env.server.name != defaults.server.name {
                config.server.name = env.server.name;
            }
            if env.server.host != defaults.server.host {
                config.server.host = env.server.host;
            }
            if env.server.port != defaults.server.port {
                config.server.port = env.server.port;
            }
            if env.server.transport_mode != defaults.server.transport_mode {
                config.server.transport_mode = env.server.transport_mode;
            }

            if env.sources.mode != defaults.sources.mode {
                config.sources.mode = env.sources.mode;
            }
            if env.sources.local_url != defaults.sources.local_url {
                config.sources.local_url = env.sources.local_url;
            }

            if env.cache.cache_dir.is_some() {
                config.cache.cache_dir = env.cache.cache_dir;
            }

            if env.logging.level != defaults.logging.level {
                config.logging.level = env.logging.level;
            }
        }

        config
    }
}
