//! Documentation query tools module
//!
//! [`DocService`] turns resolver output into typed documentation data. Every
//! operation goes through the [`Resolver`], so the active source mode applies
//! everywhere, and every network-derived result carries its [`SourceKind`].

pub mod cache;
pub mod catalog;
pub mod page;
pub mod render;

use crate::cache::{CacheStats, ClearOutcome, Store};
use crate::error::{Error, Result};
use crate::resolver::{normalize_path, Request, Resolver};
use crate::source::SourceKind;
use crate::utils::validation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Technologies searched when the caller names none
pub const POPULAR_TECHNOLOGIES: [&str; 9] = [
    "javascript",
    "python~3.12",
    "react",
    "node",
    "typescript",
    "html",
    "css",
    "vue~3",
    "angular",
];

/// One documentation set of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DocEntry {
    /// Display name
    pub name: String,
    /// Slug used in every other request
    pub slug: String,
    /// Version label
    #[serde(default)]
    pub version: Option<String>,
    /// Release label
    #[serde(default)]
    pub release: Option<String>,
}

impl DocEntry {
    /// Version, or release when there is no version
    #[must_use]
    pub fn version_label(&self) -> Option<&str> {
        self.version
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.release.as_deref().filter(|r| !r.is_empty()))
    }
}

/// One searchable entry of a technology index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexEntry {
    /// Entry name
    pub name: String,
    /// Page path, possibly with a fragment
    pub path: String,
    /// Entry type such as `class` or `method`
    #[serde(rename = "type", default)]
    pub entry_type: String,
}

/// Entry type summary of a technology index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexType {
    /// Type name
    pub name: String,
    /// Number of entries
    #[serde(default)]
    pub count: u64,
    /// Type slug
    #[serde(default)]
    pub slug: String,
}

/// Index of one technology
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DocIndex {
    /// All entries
    #[serde(default)]
    pub entries: Vec<IndexEntry>,
    /// Type summary
    #[serde(default)]
    pub types: Vec<IndexType>,
}

impl DocIndex {
    /// Fragment-free page paths, sorted
    #[must_use]
    pub fn unique_pages(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|entry| normalize_path(&entry.path))
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A value with the source that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    /// Value
    pub value: T,
    /// Source
    pub source: SourceKind,
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Technology slug
    pub technology: String,
    /// Number of entries
    pub total_entries: usize,
    /// Number of distinct pages
    pub unique_pages: usize,
    /// Type names in index order
    pub types: Vec<String>,
}

/// Entries of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntries {
    /// Matching entries
    pub entries: Vec<IndexEntry>,
    /// Every type seen in the index, lowercase and sorted
    pub available_types: BTreeSet<String>,
}

/// A rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Technology slug
    pub technology: String,
    /// Fragment-free page path
    pub path: String,
    /// Markdown with header
    pub markdown: String,
    /// Source of the underlying HTML
    pub source: SourceKind,
}

/// Outcome of fetching several pages
#[derive(Debug, Clone)]
pub struct MultiPageReport {
    /// Requested path with its page or error, in request order
    pub pages: Vec<(String, std::result::Result<RenderedPage, String>)>,
}

impl MultiPageReport {
    /// Number of pages fetched
    #[must_use]
    pub fn successful(&self) -> usize {
        self.pages.iter().filter(|(_, page)| page.is_ok()).count()
    }

    /// Number of pages that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.pages.len() - self.successful()
    }
}

/// Search results of one technology in a cross-technology search
#[derive(Debug, Clone)]
pub struct TechnologyHits {
    /// Technology slug
    pub technology: String,
    /// Entries, or the error that prevented the search
    pub outcome: std::result::Result<Vec<IndexEntry>, String>,
}

/// Cross-technology search results
#[derive(Debug, Clone)]
pub struct CrossSearchReport {
    /// Per-technology outcome, in search order
    pub results: Vec<TechnologyHits>,
}

impl CrossSearchReport {
    /// Number of technologies searched
    #[must_use]
    pub fn searched_count(&self) -> usize {
        self.results.len()
    }

    /// Entries found across all technologies
    #[must_use]
    pub fn total_results(&self) -> usize {
        self.results
            .iter()
            .filter_map(|hits| hits.outcome.as_ref().ok())
            .map(Vec::len)
            .sum()
    }
}

/// One fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExample {
    /// Language tag, `text` when absent
    pub language: String,
    /// Code without the fences
    pub code: String,
}

/// Export outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Technology slug
    pub technology: String,
    /// Output directory
    pub output_dir: PathBuf,
    /// Distinct pages in the index
    pub total_pages: usize,
    /// Pages written
    pub exported: usize,
    /// Pages that could not be fetched or written
    pub failed: usize,
    /// Bytes written
    pub total_size_bytes: u64,
}

/// Document service
pub struct DocService {
    resolver: Arc<Resolver>,
}

impl DocService {
    /// Create a document service on top of a resolver
    #[must_use]
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    /// Get resolver
    #[must_use]
    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// Get store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        self.resolver.store()
    }

    /// Catalog of every documentation set
    pub async fn docs_list(&self, force_refresh: bool) -> Result<Sourced<Vec<DocEntry>>> {
        let resolution = self
            .resolver
            .resolve(&Request::docs_list(), force_refresh)
            .await?;
        let value = parse_json(&resolution.content, "documentation list")?;
        Ok(Sourced {
            value,
            source: resolution.source,
        })
    }

    /// Catalog entries whose name or slug contains `query`, case-insensitively
    pub async fn search_docs(&self, query: &str) -> Result<Sourced<Vec<DocEntry>>> {
        let query = query.to_lowercase();
        let mut docs = self.docs_list(false).await?;
        docs.value.retain(|doc| {
            doc.name.to_lowercase().contains(&query) || doc.slug.to_lowercase().contains(&query)
        });
        Ok(docs)
    }

    /// Index of a technology
    pub async fn index(&self, technology: &str, force_refresh: bool) -> Result<Sourced<DocIndex>> {
        validation::validate_technology(technology)?;
        let resolution = self
            .resolver
            .resolve(&Request::index(technology), force_refresh)
            .await?;
        let value = parse_json(&resolution.content, &format!("index of {technology}"))?;
        Ok(Sourced {
            value,
            source: resolution.source,
        })
    }

    /// Up to `limit` entries whose name or path contains `query`
    pub async fn search_in_index(
        &self,
        technology: &str,
        query: &str,
        limit: usize,
    ) -> Result<Sourced<Vec<IndexEntry>>> {
        validation::validate_search_query(query)?;
        let index = self.index(technology, false).await?;
        let query = query.to_lowercase();

        let value = index
            .value
            .entries
            .into_iter()
            .filter(|entry| {
                entry.name.to_lowercase().contains(&query)
                    || entry.path.to_lowercase().contains(&query)
            })
            .take(limit)
            .collect();

        Ok(Sourced {
            value,
            source: index.source,
        })
    }

    /// Entry and page counts of a technology index
    pub async fn index_stats(&self, technology: &str) -> Result<Sourced<IndexStats>> {
        let index = self.index(technology, false).await?;
        let value = IndexStats {
            technology: technology.to_string(),
            total_entries: index.value.entries.len(),
            unique_pages: index.value.unique_pages().len(),
            types: index.value.types.iter().map(|t| t.name.clone()).collect(),
        };
        Ok(Sourced {
            value,
            source: index.source,
        })
    }

    /// Up to `limit` entries whose type contains `entry_type`
    pub async fn type_entries(
        &self,
        technology: &str,
        entry_type: &str,
        limit: usize,
    ) -> Result<Sourced<TypeEntries>> {
        let index = self.index(technology, false).await?;
        let wanted = entry_type.to_lowercase();

        let mut available_types = BTreeSet::new();
        let mut entries = Vec::new();
        for entry in index.value.entries {
            let kind = entry.entry_type.to_lowercase();
            if kind.is_empty() {
                continue;
            }
            let matches = kind.contains(&wanted);
            available_types.insert(kind);
            if matches && entries.len() < limit {
                entries.push(entry);
            }
        }

        Ok(Sourced {
            value: TypeEntries {
                entries,
                available_types,
            },
            source: index.source,
        })
    }

    /// Search several technologies; per-technology failures are reported, not fatal
    pub async fn search_across(
        &self,
        query: &str,
        technologies: Option<&[String]>,
        limit_per_technology: usize,
    ) -> Result<CrossSearchReport> {
        validation::validate_search_query(query)?;
        let technologies: Vec<String> = match technologies {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => POPULAR_TECHNOLOGIES.iter().map(|t| (*t).to_string()).collect(),
        };

        let mut results = Vec::with_capacity(technologies.len());
        for technology in technologies {
            let outcome = self
                .search_in_index(&technology, query, limit_per_technology)
                .await
                .map(|hits| hits.value)
                .map_err(|e| e.to_string());
            results.push(TechnologyHits {
                technology,
                outcome,
            });
        }

        Ok(CrossSearchReport { results })
    }

    /// Page rendered to Markdown with a header naming its public URL
    pub async fn page(
        &self,
        technology: &str,
        path: &str,
        force_refresh: bool,
    ) -> Result<RenderedPage> {
        validation::validate_technology(technology)?;
        validation::validate_page_path(path)?;

        let clean_path = normalize_path(path);
        let resolution = self
            .resolver
            .resolve(&Request::page(technology, clean_path), force_refresh)
            .await?;

        Ok(RenderedPage {
            technology: technology.to_string(),
            path: clean_path.to_string(),
            markdown: render::render_page(technology, clean_path, &resolution.content),
            source: resolution.source,
        })
    }

    /// Several pages of one technology; each path succeeds or fails on its own
    pub async fn multiple_pages(&self, technology: &str, paths: &[String]) -> MultiPageReport {
        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = self
                .page(technology, path, false)
                .await
                .map_err(|e| e.to_string());
            pages.push((path.clone(), outcome));
        }
        MultiPageReport { pages }
    }

    /// Fenced code blocks of a page
    pub async fn examples(&self, technology: &str, path: &str) -> Result<Sourced<Vec<CodeExample>>> {
        let page = self.page(technology, path, false).await?;
        Ok(Sourced {
            value: render::extract_code_blocks(&page.markdown),
            source: page.source,
        })
    }

    /// Write the distinct pages of a technology as Markdown files
    pub async fn export(
        &self,
        technology: &str,
        output_dir: &Path,
        max_pages: Option<usize>,
    ) -> Result<ExportReport> {
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            Error::Other(format!(
                "Failed to create export directory {}: {e}",
                output_dir.display()
            ))
        })?;

        let index = self.index(technology, false).await?;
        let pages = index.value.unique_pages();
        let total_pages = pages.len();
        let limit = max_pages.filter(|max| *max > 0).unwrap_or(total_pages);

        let mut report = ExportReport {
            technology: technology.to_string(),
            output_dir: output_dir.to_path_buf(),
            total_pages,
            exported: 0,
            failed: 0,
            total_size_bytes: 0,
        };

        for path in pages.iter().take(limit) {
            let page = match self.page(technology, path, false).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::debug!("Export of {}/{} failed: {}", technology, path, e);
                    report.failed += 1;
                    continue;
                }
            };

            let file = output_dir.join(format!(
                "{}.md",
                crate::cache::disk::sanitize_file_name(path)
            ));
            match tokio::fs::write(&file, &page.markdown).await {
                Ok(()) => {
                    report.exported += 1;
                    report.total_size_bytes += page.markdown.len() as u64;
                }
                Err(e) => {
                    tracing::warn!("Failed to write {}: {}", file.display(), e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Exported {} of {} pages of {} to {}",
            report.exported,
            total_pages,
            technology,
            output_dir.display()
        );
        Ok(report)
    }

    /// What can be served without network access
    pub async fn offline_status(&self) -> Result<CacheStats> {
        self.store().stats().await
    }

    /// Store statistics
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        self.store().stats().await
    }

    /// Remove one technology, or everything, from the store
    pub async fn clear_cache(&self, technology: Option<&str>) -> Result<ClearOutcome> {
        if let Some(technology) = technology {
            validation::validate_technology(technology)?;
        }
        let outcome = self.store().clear(technology).await?;
        tracing::info!("Cleared cache: {} (found: {})", outcome.cleared, outcome.found);
        Ok(outcome)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(content: &str, what: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| Error::Parse(format!("{what}: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::cache::CacheKey;
    use crate::resolver::Mode;

    pub(crate) const INDEX_JSON: &str = r#"{
        "entries": [
            {"name": "asyncio", "path": "library/asyncio", "type": "Networking"},
            {"name": "asyncio.run()", "path": "library/asyncio-runner#asyncio.run", "type": "Networking"},
            {"name": "os.path", "path": "library/os.path", "type": "File Formats"},
            {"name": "Path", "path": "library/pathlib#pathlib.Path", "type": "Class"},
            {"name": "untyped", "path": "library/misc"}
        ],
        "types": [
            {"name": "Networking", "count": 2, "slug": "networking"},
            {"name": "File Formats", "count": 1, "slug": "file-formats"},
            {"name": "Class", "count": 1, "slug": "class"}
        ]
    }"#;

    pub(crate) const DOCS_JSON: &str = r#"[
        {"name": "Python", "slug": "python~3.12", "version": "3.12", "release": "3.12.1", "mtime": 1700000000},
        {"name": "React", "slug": "react", "release": "18.2.0"},
        {"name": "JavaScript", "slug": "javascript"}
    ]"#;

    /// Offline service over a memory store seeded with python data
    pub(crate) async fn offline_service() -> DocService {
        let store = Arc::new(MemoryStore::new());
        store.put(&CacheKey::DocsList, DOCS_JSON).await.unwrap();
        store
            .put(
                &CacheKey::Index {
                    technology: "python~3.12".to_string(),
                },
                INDEX_JSON,
            )
            .await
            .unwrap();
        store
            .put(
                &CacheKey::Page {
                    technology: "python~3.12".to_string(),
                    path: "library/asyncio".to_string(),
                },
                "<h1>asyncio</h1><p>Asynchronous I/O</p><pre><code class=\"language-python\">import asyncio</code></pre>",
            )
            .await
            .unwrap();

        let unreachable = crate::resolver::tests::StubSource::down();
        let resolver = Resolver::new(unreachable.clone(), unreachable, store).with_mode(Mode::Offline);
        DocService::new(Arc::new(resolver))
    }

    #[test]
    fn test_doc_entry_version_label() {
        let docs: Vec<DocEntry> = serde_json::from_str(DOCS_JSON).unwrap();
        assert_eq!(docs[0].version_label(), Some("3.12"));
        assert_eq!(docs[1].version_label(), Some("18.2.0"));
        assert_eq!(docs[2].version_label(), None);
    }

    #[test]
    fn test_unique_pages_strip_fragments() {
        let index: DocIndex = serde_json::from_str(INDEX_JSON).unwrap();
        let pages = index.unique_pages();
        assert_eq!(pages.len(), 5);
        assert!(pages.contains("library/asyncio-runner"));
        assert!(pages.contains("library/pathlib"));
    }

    #[tokio::test]
    async fn test_search_docs_matches_name_or_slug() {
        let service = offline_service().await;

        let by_name = service.search_docs("PYTHON").await.unwrap();
        assert_eq!(by_name.value.len(), 1);
        assert_eq!(by_name.source, SourceKind::Cache);

        let by_slug = service.search_docs("~3.12").await.unwrap();
        assert_eq!(by_slug.value[0].slug, "python~3.12");

        assert!(service.search_docs("cobol").await.unwrap().value.is_empty());
    }

    #[tokio::test]
    async fn test_search_in_index_limit() {
        let service = offline_service().await;

        let hits = service
            .search_in_index("python~3.12", "asyncio", 20)
            .await
            .unwrap();
        assert_eq!(hits.value.len(), 2);

        let limited = service
            .search_in_index("python~3.12", "library", 3)
            .await
            .unwrap();
        assert_eq!(limited.value.len(), 3);
    }

    #[tokio::test]
    async fn test_index_stats() {
        let service = offline_service().await;
        let stats = service.index_stats("python~3.12").await.unwrap().value;
        assert_eq!(stats.total_entries, 5);
        assert_eq!(stats.unique_pages, 5);
        assert_eq!(stats.types, vec!["Networking", "File Formats", "Class"]);
    }

    #[tokio::test]
    async fn test_type_entries() {
        let service = offline_service().await;
        let result = service
            .type_entries("python~3.12", "networking", 1)
            .await
            .unwrap()
            .value;
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].name, "asyncio");
        assert_eq!(result.available_types.len(), 3);
        assert!(result.available_types.contains("file formats"));

        let none = service
            .type_entries("python~3.12", "hook", 10)
            .await
            .unwrap()
            .value;
        assert!(none.entries.is_empty());
        assert!(!none.available_types.is_empty());
    }

    #[tokio::test]
    async fn test_page_render_and_fragment() {
        let service = offline_service().await;
        let page = service
            .page("python~3.12", "library/asyncio#asyncio.run", false)
            .await
            .unwrap();
        assert_eq!(page.path, "library/asyncio");
        assert_eq!(page.source, SourceKind::Cache);
        assert!(page.markdown.starts_with("# library/asyncio"));
        assert!(page
            .markdown
            .contains("https://devdocs.io/python~3.12/library/asyncio"));
        assert!(page.markdown.contains("Asynchronous I/O"));
    }

    #[tokio::test]
    async fn test_multiple_pages_reports_each_path() {
        let service = offline_service().await;
        let report = service
            .multiple_pages(
                "python~3.12",
                &["library/asyncio".to_string(), "library/missing".to_string()],
            )
            .await;
        assert_eq!(report.successful(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.pages[1].1.is_err());
    }

    #[tokio::test]
    async fn test_search_across_reports_errors() {
        let service = offline_service().await;
        let techs = vec!["python~3.12".to_string(), "rust".to_string()];
        let report = service
            .search_across("asyncio", Some(&techs), 5)
            .await
            .unwrap();
        assert_eq!(report.searched_count(), 2);
        assert_eq!(report.total_results(), 2);
        assert!(report.results[1].outcome.is_err());

        let defaults = service.search_across("asyncio", None, 5).await.unwrap();
        assert_eq!(defaults.searched_count(), POPULAR_TECHNOLOGIES.len());
    }

    #[tokio::test]
    async fn test_export_counts_failures() {
        let service = offline_service().await;
        let dir = tempfile::tempdir().unwrap();

        let report = service
            .export("python~3.12", dir.path(), None)
            .await
            .unwrap();
        assert_eq!(report.total_pages, 5);
        assert_eq!(report.exported, 1);
        assert_eq!(report.failed, 4);
        assert!(dir.path().join("library_asyncio.md").exists());
        assert!(report.total_size_bytes > 0);

        let limited = service
            .export("python~3.12", dir.path(), Some(2))
            .await
            .unwrap();
        assert_eq!(limited.exported + limited.failed, 2);
    }

    #[tokio::test]
    async fn test_export_writes_similar_paths_to_separate_files() {
        let store = Arc::new(MemoryStore::new());
        let index = r#"{"entries": [
            {"name": "basic_string", "path": "string/basic_string", "type": "Strings"},
            {"name": "basic_string alias", "path": "string-basic_string", "type": "Strings"}
        ], "types": []}"#;
        store
            .put(&CacheKey::Index { technology: "cpp".to_string() }, index)
            .await
            .unwrap();
        for (path, body) in [
            ("string/basic_string", "<p>slash page</p>"),
            ("string-basic_string", "<p>dash page</p>"),
        ] {
            let key = CacheKey::Page {
                technology: "cpp".to_string(),
                path: path.to_string(),
            };
            store.put(&key, body).await.unwrap();
        }

        let unreachable = crate::resolver::tests::StubSource::down();
        let resolver =
            Resolver::new(unreachable.clone(), unreachable, store).with_mode(Mode::Offline);
        let service = DocService::new(Arc::new(resolver));
        let dir = tempfile::tempdir().unwrap();

        let report = service.export("cpp", dir.path(), None).await.unwrap();
        assert_eq!(report.exported, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

        for (path, body) in [
            ("string/basic_string", "slash page"),
            ("string-basic_string", "dash page"),
        ] {
            let file = dir
                .path()
                .join(format!("{}.md", crate::cache::disk::sanitize_file_name(path)));
            assert!(std::fs::read_to_string(file).unwrap().contains(body));
        }
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let service = offline_service().await;
        let outcome = service.clear_cache(Some("python~3.12")).await.unwrap();
        assert!(outcome.found);
        assert!(service.index("python~3.12", false).await.is_err());

        let stats = service.cache_stats().await.unwrap();
        assert!(stats.docs_list_cached);
        assert!(stats.technologies.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_technology_rejected() {
        let service = offline_service().await;
        assert!(service.index("../etc", false).await.is_err());
        assert!(service.clear_cache(Some("a b")).await.is_err());
    }
}
