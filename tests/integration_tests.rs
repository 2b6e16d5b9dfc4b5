//! Integration tests

use async_trait::async_trait;
use devdocs_mcp::{
    cache::{disk::DiskStore, CacheKey, Store},
    config::AppConfig,
    error::{Error, Result},
    resolver::{availability::AvailabilityState, Mode, Request, Resolver},
    server::DevDocsServer,
    source::{Endpoints, Source, SourceKind},
    tools::docs::DocService,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const LOCAL_URL: &str = "http://127.0.0.1:9292";

const DOCS_JSON: &str = r#"[
    {"name": "Python", "slug": "python~3.12", "version": "3.12", "release": "3.12.1"},
    {"name": "Rust", "slug": "rust", "release": "1.75.0"}
]"#;

const INDEX_JSON: &str = r#"{
    "entries": [
        {"name": "asyncio", "path": "library/asyncio", "type": "Networking"},
        {"name": "asyncio.run()", "path": "library/asyncio-runner#asyncio.run", "type": "Networking"},
        {"name": "json", "path": "library/json", "type": "Internet Data"}
    ],
    "types": [
        {"name": "Networking", "count": 2, "slug": "networking"},
        {"name": "Internet Data", "count": 1, "slug": "internet-data"}
    ]
}"#;

const ASYNCIO_HTML: &str = "<h1>asyncio</h1><p>Asynchronous I/O.</p><pre><code class=\"language-python\">asyncio.run(main())</code></pre>";

/// In-process source answering from a URL map
#[derive(Default)]
struct FakeSource {
    reachable: AtomicBool,
    pages: Mutex<HashMap<String, String>>,
    fetches: AtomicUsize,
}

impl FakeSource {
    fn reachable() -> Arc<Self> {
        let source = Self::default();
        source.reachable.store(true, Ordering::SeqCst);
        Arc::new(source)
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn serve(&self, url: &str, body: &str) {
        self.pages.lock().insert(url.to_string(), body.to_string());
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for FakeSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(Error::SourceUnreachable(url.to_string()));
        }
        self.pages
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NotFound(url.to_string()))
    }

    async fn probe(&self, _url: &str) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

fn resolver(
    local: Arc<FakeSource>,
    remote: Arc<FakeSource>,
    store: Arc<dyn Store>,
    mode: Mode,
) -> Arc<Resolver> {
    Arc::new(
        Resolver::new(local, remote, store)
            .with_mode(mode)
            .with_local_url(LOCAL_URL),
    )
}

fn seed_disk_cache(root: &std::path::Path) {
    std::fs::write(root.join("docs.json"), DOCS_JSON).unwrap();
    let python = root.join("python~3.12");
    std::fs::create_dir_all(&python).unwrap();
    std::fs::write(python.join("index.json"), INDEX_JSON).unwrap();
    std::fs::write(python.join("library_asyncio.html"), ASYNCIO_HTML).unwrap();
}

/// Offline mode serves a pre-populated cache directory without touching the network
#[tokio::test]
async fn test_offline_reads_existing_cache_directory() {
    let dir = tempfile::tempdir().unwrap();
    seed_disk_cache(dir.path());

    let local = FakeSource::reachable();
    let remote = FakeSource::reachable();
    let store: Arc<dyn Store> = Arc::new(DiskStore::new(dir.path()).unwrap());
    let service = DocService::new(resolver(
        local.clone(),
        remote.clone(),
        store,
        Mode::Offline,
    ));

    let docs = service.docs_list(false).await.unwrap();
    assert_eq!(docs.value.len(), 2);
    assert_eq!(docs.source, SourceKind::Cache);

    let page = service
        .page("python~3.12", "library/asyncio#asyncio.run", false)
        .await
        .unwrap();
    assert_eq!(page.source, SourceKind::Cache);
    assert_eq!(page.path, "library/asyncio");
    assert!(page.markdown.contains("Asynchronous I/O"));

    let missing = service.page("python~3.12", "library/json", false).await;
    match missing {
        Err(Error::Unavailable { mode, detail }) => {
            assert_eq!(mode, "offline");
            assert!(detail.contains("page:python~3.12:library/json"));
        }
        other => panic!("expected unavailable, got {other:?}"),
    }

    assert_eq!(local.fetches(), 0);
    assert_eq!(remote.fetches(), 0);
    assert_eq!(service.resolver().local_availability(), AvailabilityState::Unknown);
}

/// Auto mode falls through to the remote service and writes the result to disk
#[tokio::test]
async fn test_auto_remote_write_through_then_offline() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(DiskStore::new(dir.path()).unwrap());

    let remote = FakeSource::reachable();
    let endpoints = Endpoints::remote();
    remote.serve(&endpoints.index("python~3.12"), INDEX_JSON);
    remote.serve(&endpoints.page("python~3.12", "library/asyncio"), ASYNCIO_HTML);

    let resolver = resolver(FakeSource::unreachable(), remote.clone(), store.clone(), Mode::Auto);
    let service = DocService::new(resolver.clone());

    let index = service.index("python~3.12", false).await.unwrap();
    assert_eq!(index.source, SourceKind::Remote);
    assert_eq!(resolver.local_availability(), AvailabilityState::Unavailable);

    let page = service.page("python~3.12", "library/asyncio", false).await.unwrap();
    assert_eq!(page.source, SourceKind::Remote);
    assert_eq!(resolver.last_source(), Some(SourceKind::Remote));

    assert!(dir.path().join("python~3.12").join("index.json").exists());
    assert!(dir
        .path()
        .join("python~3.12")
        .join("library_asyncio.html")
        .exists());

    resolver.set_mode(Mode::Offline);
    let cached = service.page("python~3.12", "library/asyncio", false).await.unwrap();
    assert_eq!(cached.source, SourceKind::Cache);
    assert_eq!(remote.fetches(), 2);

    let stats = service.offline_status().await.unwrap();
    let python = &stats.technologies["python~3.12"];
    assert_eq!(python.files, 1);
    assert!(python.has_index);
}

/// The cache answers before the remote service unless a refresh is forced
#[tokio::test]
async fn test_auto_prefers_cache_over_remote() {
    let dir = tempfile::tempdir().unwrap();
    seed_disk_cache(dir.path());
    let store: Arc<dyn Store> = Arc::new(DiskStore::new(dir.path()).unwrap());

    let remote = FakeSource::reachable();
    remote.serve(Endpoints::remote().docs_list(), r#"[{"name": "Go", "slug": "go"}]"#);

    let service = DocService::new(resolver(
        FakeSource::unreachable(),
        remote.clone(),
        store,
        Mode::Auto,
    ));

    let cached = service.docs_list(false).await.unwrap();
    assert_eq!(cached.source, SourceKind::Cache);
    assert_eq!(cached.value.len(), 2);
    assert_eq!(remote.fetches(), 0);

    let refreshed = service.docs_list(true).await.unwrap();
    assert_eq!(refreshed.source, SourceKind::Remote);
    assert_eq!(refreshed.value[0].slug, "go");
}

/// A local 404 is a miss, not an outage
#[tokio::test]
async fn test_local_not_found_keeps_local_available() {
    let store: Arc<dyn Store> = Arc::new(devdocs_mcp::cache::memory::MemoryStore::new());
    let local = FakeSource::reachable();
    let local_endpoints = Endpoints::local(LOCAL_URL);
    local.serve(&local_endpoints.page("python~3.12", "library/asyncio"), ASYNCIO_HTML);

    let resolver = resolver(local, FakeSource::unreachable(), store.clone(), Mode::LocalOnly);

    let hit = resolver
        .resolve(&Request::page("python~3.12", "library/asyncio"), false)
        .await
        .unwrap();
    assert_eq!(hit.source, SourceKind::Local);
    assert!(store
        .exists(&CacheKey::Page {
            technology: "python~3.12".to_string(),
            path: "library/asyncio".to_string(),
        })
        .await);

    let miss = resolver
        .resolve(&Request::page("python~3.12", "library/json"), false)
        .await
        .unwrap_err();
    assert!(miss.to_string().contains(LOCAL_URL));
    assert_eq!(resolver.local_availability(), AvailabilityState::Available);
}

/// Export writes one Markdown file per distinct page
#[tokio::test]
async fn test_export_from_cache() {
    let cache = tempfile::tempdir().unwrap();
    seed_disk_cache(cache.path());
    let out = tempfile::tempdir().unwrap();

    let store: Arc<dyn Store> = Arc::new(DiskStore::new(cache.path()).unwrap());
    let service = DocService::new(resolver(
        FakeSource::unreachable(),
        FakeSource::unreachable(),
        store,
        Mode::Offline,
    ));

    let report = service
        .export("python~3.12", out.path(), None)
        .await
        .unwrap();
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.exported, 1);
    assert_eq!(report.failed, 2);
    assert!(out.path().join("library_asyncio.md").exists());
}

/// The server exposes every tool and drives them through the registry
#[tokio::test]
async fn test_server_tools_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    seed_disk_cache(dir.path());

    let mut config = AppConfig::default();
    config.cache.cache_dir = Some(dir.path().display().to_string());
    config.sources.mode = "offline".to_string();
    let server = DevDocsServer::new(config).unwrap();

    let mut names: Vec<String> = server
        .tool_registry()
        .get_tools()
        .into_iter()
        .map(|tool| tool.name)
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "clear_cache",
            "export_documentation",
            "get_cache_stats",
            "get_documentation_index",
            "get_examples",
            "get_multiple_pages",
            "get_page_content",
            "get_type_entries",
            "list_documentations",
            "offline_mode_status",
            "search_across_docs",
            "search_documentation",
            "set_local_url",
            "set_source_mode",
            "source_status",
        ]
    );

    let registry = server.tool_registry();
    let result = registry
        .execute_tool(
            "get_page_content",
            serde_json::json!({"tech": "python~3.12", "path": "library/asyncio"}),
        )
        .await
        .unwrap();
    let body = serde_json::to_string(&result).unwrap();
    assert!(body.contains("Asynchronous I/O"));
    assert!(body.contains("_Source: cache_"));

    let missing = registry
        .execute_tool(
            "get_page_content",
            serde_json::json!({"tech": "python~3.12", "path": "library/json"}),
        )
        .await;
    assert!(missing.is_err());

    assert!(registry
        .execute_tool("no_such_tool", serde_json::json!({}))
        .await
        .is_err());

    registry
        .execute_tool("set_source_mode", serde_json::json!({"mode": "remote_only"}))
        .await
        .unwrap();
    assert_eq!(server.service().resolver().mode(), Mode::RemoteOnly);
}
