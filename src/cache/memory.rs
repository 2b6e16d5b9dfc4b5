//! In-memory store implementation

use super::{CacheKey, CacheStats, ClearOutcome};
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory store implementation
///
/// Same semantics as the disk store, minus persistence across processes.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<CacheKey, String>>,
}

impl MemoryStore {
    /// Create an empty memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait::async_trait]
impl super::Store for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    async fn put(&self, key: &CacheKey, content: &str) -> Result<()> {
        self.entries.write().insert(key.clone(), content.to_string());
        Ok(())
    }

    async fn exists(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(key)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.entries.read();
        let mut stats = CacheStats {
            cache_dir: "memory".to_string(),
            docs_list_cached: entries.contains_key(&CacheKey::DocsList),
            ..CacheStats::default()
        };

        for (key, content) in entries.iter() {
            match key {
                CacheKey::DocsList => {}
                CacheKey::Index { technology } => {
                    stats
                        .technologies
                        .entry(technology.clone())
                        .or_default()
                        .has_index = true;
                }
                CacheKey::Page { technology, .. } => {
                    let tech = stats.technologies.entry(technology.clone()).or_default();
                    tech.files += 1;
                    tech.size_bytes += content.len() as u64;
                    stats.total_files += 1;
                    stats.total_size_bytes += content.len() as u64;
                }
            }
        }

        Ok(stats)
    }

    async fn clear(&self, technology: Option<&str>) -> Result<ClearOutcome> {
        let mut entries = self.entries.write();
        match technology {
            Some(tech) => {
                let before = entries.len();
                entries.retain(|key, _| key.technology() != Some(tech));
                Ok(ClearOutcome {
                    cleared: tech.to_string(),
                    found: entries.len() != before,
                })
            }
            None => {
                entries.clear();
                Ok(ClearOutcome {
                    cleared: "all".to_string(),
                    found: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Store;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let key = CacheKey::Index {
            technology: "rust".to_string(),
        };

        assert_eq!(store.get(&key).await, None);
        store.put(&key, "{\"entries\":[]}").await.unwrap();
        assert_eq!(store.get(&key).await.as_deref(), Some("{\"entries\":[]}"));
        assert!(store.exists(&key).await);

        store.put(&key, "{}").await.unwrap();
        assert_eq!(store.get(&key).await.as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_clear() {
        let store = MemoryStore::new();
        let rust_page = CacheKey::Page {
            technology: "rust".to_string(),
            path: "std/vec".to_string(),
        };
        store.put(&CacheKey::DocsList, "[]").await.unwrap();
        store.put(&rust_page, "vec").await.unwrap();

        let outcome = store.clear(Some("rust")).await.unwrap();
        assert!(outcome.found);
        assert!(!store.exists(&rust_page).await);
        assert!(store.exists(&CacheKey::DocsList).await);

        assert!(!store.clear(Some("go")).await.unwrap().found);

        store.clear(None).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_stats() {
        let store = MemoryStore::new();
        store
            .put(
                &CacheKey::Page {
                    technology: "go".to_string(),
                    path: "fmt".to_string(),
                },
                "abcd",
            )
            .await
            .unwrap();
        store
            .put(
                &CacheKey::Index {
                    technology: "go".to_string(),
                },
                "{}",
            )
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.cache_dir, "memory");
        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.total_size_bytes, 4);
        assert!(stats.technologies["go"].has_index);
    }
}
