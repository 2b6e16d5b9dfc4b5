//! Disk store implementation
//!
//! Layout under the cache directory:
//!
//! ```text
//! docs.json                  catalog
//! {technology}/index.json    index
//! {technology}/{page}.html   pages, file name sanitized
//! ```

use super::{CacheKey, CacheStats, ClearOutcome, TechnologyStats};
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const DOCS_LIST_FILE: &str = "docs.json";
const INDEX_FILE: &str = "index.json";
const PAGE_EXTENSION: &str = "html";
const MAX_FILE_NAME: usize = 200;
const HASH_BYTES: usize = 8;

/// Disk store implementation
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a disk store rooted at `root`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            Error::Cache(format!(
                "failed to create cache directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// Cache root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        match key {
            CacheKey::DocsList => self.root.join(DOCS_LIST_FILE),
            CacheKey::Index { technology } => {
                self.technology_dir(technology).join(INDEX_FILE)
            }
            CacheKey::Page { technology, path } => self
                .technology_dir(technology)
                .join(format!("{}.{PAGE_EXTENSION}", sanitize_file_name(path))),
        }
    }

    fn technology_dir(&self, technology: &str) -> PathBuf {
        self.root.join(sanitize_dir_name(technology))
    }

    async fn technology_stats(dir: &Path) -> Result<TechnologyStats> {
        let mut stats = TechnologyStats {
            has_index: tokio::fs::try_exists(dir.join(INDEX_FILE))
                .await
                .unwrap_or(false),
            ..TechnologyStats::default()
        };

        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PAGE_EXTENSION) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                stats.files += 1;
                stats.size_bytes += metadata.len();
            }
        }

        Ok(stats)
    }
}

#[async_trait::async_trait]
impl super::Store for DiskStore {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        tokio::fs::read_to_string(self.path_for(key)).await.ok()
    }

    async fn put(&self, key: &CacheKey, content: &str) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        tracing::trace!("Wrote {} to {}", key, path.display());
        Ok(())
    }

    async fn exists(&self, key: &CacheKey) -> bool {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats {
            cache_dir: self.root.display().to_string(),
            docs_list_cached: self.exists(&CacheKey::DocsList).await,
            ..CacheStats::default()
        };

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stats),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let tech_stats = Self::technology_stats(&entry.path()).await?;
            stats.total_files += tech_stats.files;
            stats.total_size_bytes += tech_stats.size_bytes;
            stats.technologies.insert(name, tech_stats);
        }

        Ok(stats)
    }

    async fn clear(&self, technology: Option<&str>) -> Result<ClearOutcome> {
        if let Some(tech) = technology {
            let dir = self.technology_dir(tech);
            let found = tokio::fs::try_exists(&dir).await.unwrap_or(false);
            if found {
                tokio::fs::remove_dir_all(&dir).await?;
            }
            return Ok(ClearOutcome {
                cleared: tech.to_string(),
                found,
            });
        }

        if tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&self.root).await?;
        }
        tokio::fs::create_dir_all(&self.root).await?;

        Ok(ClearOutcome {
            cleared: "all".to_string(),
            found: true,
        })
    }
}

/// Turn a page path into a file name
///
/// Plain paths (lowercase ASCII letters, digits, `.` and `~` in non-empty
/// segments) map to their segments joined by `_`, so `library/asyncio`
/// becomes `library_asyncio`. Any other path gets a lossy stem followed by
/// `-` and 16 hex digits of the SHA-256 of the raw path, so a path that
/// already holds `_` is hashed. Plain names never contain `-`, so two
/// distinct paths never share a file name.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let readable = readable_file_name(name);
    if is_plain_path(name) && readable.len() <= MAX_FILE_NAME {
        return readable;
    }

    let digest = Sha256::digest(name.as_bytes());
    let suffix = hex::encode(&digest[..HASH_BYTES]);
    let mut end = readable.len().min(MAX_FILE_NAME - suffix.len() - 1);
    while !readable.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}-{suffix}", &readable[..end])
}

fn is_plain_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('/').all(|segment| {
            !segment.is_empty()
                && segment.chars().all(|c| {
                    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '~')
                })
        })
}

// `<>:"/\|?*` become `_`, runs of `-` or whitespace collapse into one `_`,
// leading and trailing `_` are trimmed.
fn readable_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.chars() {
        if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            out.push('_');
            in_run = false;
        } else if c == '-' || c.is_whitespace() {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.to_string()
    }
}

// Keeps a technology slug inside the cache root.
fn sanitize_dir_name(technology: &str) -> String {
    let name = technology.replace(['/', '\\'], "_");
    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name,
    }
}
