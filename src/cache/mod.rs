//! Persistent store module
//!
//! Content fetched from the network is kept here so later requests, and the
//! offline mode, can be answered without contacting any source. Two backends
//! share the [`Store`] trait: a directory tree on disk and an in-memory map.
//!
//! Entries never expire. The store only shrinks through [`Store::clear`].

pub mod disk;
pub mod memory;

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Collection an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Global catalog of documentation sets
    DocsList,
    /// Entry/type index of one technology
    Index,
    /// One documentation page
    Page,
}

impl Collection {
    /// Stable collection name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::DocsList => "docs-list",
            Collection::Index => "index",
            Collection::Page => "page",
        }
    }
}

/// Address of a cache entry
///
/// Rendered as `docs-list`, `index:{technology}` or `page:{technology}:{path}`.
/// Page paths are expected to be fragment-free already; see
/// [`crate::resolver::Request::page`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Singleton catalog entry
    DocsList,
    /// Index of a technology
    Index {
        /// Technology slug
        technology: String,
    },
    /// Page of a technology
    Page {
        /// Technology slug
        technology: String,
        /// Normalized page path
        path: String,
    },
}

impl CacheKey {
    /// Collection of this key
    #[must_use]
    pub fn collection(&self) -> Collection {
        match self {
            CacheKey::DocsList => Collection::DocsList,
            CacheKey::Index { .. } => Collection::Index,
            CacheKey::Page { .. } => Collection::Page,
        }
    }

    /// Technology partition of this key, if any
    #[must_use]
    pub fn technology(&self) -> Option<&str> {
        match self {
            CacheKey::DocsList => None,
            CacheKey::Index { technology } | CacheKey::Page { technology, .. } => {
                Some(technology)
            }
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::DocsList => write!(f, "docs-list"),
            CacheKey::Index { technology } => write!(f, "index:{technology}"),
            CacheKey::Page { technology, path } => write!(f, "page:{technology}:{path}"),
        }
    }
}

/// Per-technology statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TechnologyStats {
    /// Number of cached pages
    pub files: usize,
    /// Total size of cached pages in bytes
    pub size_bytes: u64,
    /// Whether the technology index is cached
    pub has_index: bool,
}

/// Store statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Where the store lives (`memory` for the in-memory backend)
    pub cache_dir: String,
    /// Cached pages across all technologies
    pub total_files: usize,
    /// Total size of cached pages in bytes
    pub total_size_bytes: u64,
    /// Whether the global catalog is cached
    pub docs_list_cached: bool,
    /// Statistics per technology
    pub technologies: BTreeMap<String, TechnologyStats>,
}

/// Result of a clear operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    /// Technology cleared, or `all`
    pub cleared: String,
    /// Whether anything existed to clear
    pub found: bool,
}

/// Store trait
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Read an entry
    async fn get(&self, key: &CacheKey) -> Option<String>;

    /// Write an entry, replacing any previous content
    async fn put(&self, key: &CacheKey, content: &str) -> Result<()>;

    /// Check whether an entry exists
    async fn exists(&self, key: &CacheKey) -> bool {
        self.get(key).await.is_some()
    }

    /// Collect statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Remove one technology, or everything when `technology` is `None`
    async fn clear(&self, technology: Option<&str>) -> Result<ClearOutcome>;
}

/// Store configuration
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store type: disk or memory
    pub cache_type: String,

    /// Cache directory (defaults to the user cache dir)
    pub cache_dir: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: "disk".to_string(),
            cache_dir: None,
        }
    }
}

impl CacheConfig {
    /// Directory used by the disk store
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.cache_dir
            .as_ref()
            .map_or_else(default_cache_dir, PathBuf::from)
    }
}

/// Default cache directory, `~/.cache/devdocs-mcp` on Linux
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("devdocs-mcp")
}

/// Create a store instance
///
/// # Errors
///
/// Returns an error if the store type is unsupported or the cache directory
/// cannot be created
pub fn create_store(config: &CacheConfig) -> Result<Box<dyn Store>> {
    match config.cache_type.as_str() {
        "disk" => Ok(Box::new(disk::DiskStore::new(config.resolved_dir())?)),
        "memory" => Ok(Box::new(memory::MemoryStore::new())),
        other => Err(Error::Config(format!("unsupported cache type: {other}"))),
    }
}
