//! Multi-source resolution
//!
//! The [`Resolver`] answers a [`Request`] from the local DevDocs peer, the
//! persistent store or the public service, in the order the active [`Mode`]
//! prescribes:
//!
//! | mode          | order                                   |
//! |---------------|-----------------------------------------|
//! | `auto`        | local, store, remote, store (last try)  |
//! | `local_only`  | local                                   |
//! | `remote_only` | remote                                  |
//! | `offline`     | store                                   |
//!
//! Content obtained from the network is written through to the store. Content
//! read from the store is never written back. Every source failure is a miss;
//! only running out of sources is an error ([`Error::Unavailable`]).

pub mod availability;

use crate::cache::{CacheKey, Store};
use crate::error::{Error, Result};
use crate::source::{Endpoints, Source, SourceKind, DEFAULT_LOCAL_URL};
use availability::{Availability, AvailabilityState};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Local, then store, then remote
    #[default]
    Auto,
    /// Local only
    LocalOnly,
    /// Remote only; the store is still written
    RemoteOnly,
    /// Store only; never touches the network
    Offline,
}

impl Mode {
    /// All modes
    pub const ALL: [Mode; 4] = [Mode::Auto, Mode::LocalOnly, Mode::RemoteOnly, Mode::Offline];

    /// Configuration name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::LocalOnly => "local_only",
            Mode::RemoteOnly => "remote_only",
            Mode::Offline => "offline",
        }
    }

    /// Parse a mode name, falling back to [`Mode::Auto`] on anything unknown
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::debug!("Unknown mode '{}', using auto", s);
            Mode::Auto
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(Mode::Auto),
            "local_only" => Ok(Mode::LocalOnly),
            "remote_only" => Ok(Mode::RemoteOnly),
            "offline" => Ok(Mode::Offline),
            _ => Err(format!("unknown mode: {s}")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical data request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Catalog of all documentation sets
    DocsList,
    /// Index of one technology
    Index {
        /// Technology slug
        technology: String,
    },
    /// One page of a technology
    Page {
        /// Technology slug
        technology: String,
        /// Page path; any `#fragment` is ignored
        path: String,
    },
}

impl Request {
    /// Catalog request
    #[must_use]
    pub fn docs_list() -> Self {
        Request::DocsList
    }

    /// Index request
    #[must_use]
    pub fn index(technology: impl Into<String>) -> Self {
        Request::Index {
            technology: technology.into(),
        }
    }

    /// Page request; the fragment is stripped here
    #[must_use]
    pub fn page(technology: impl Into<String>, path: &str) -> Self {
        Request::Page {
            technology: technology.into(),
            path: normalize_path(path).to_string(),
        }
    }

    /// Store address of this request
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        match self {
            Request::DocsList => CacheKey::DocsList,
            Request::Index { technology } => CacheKey::Index {
                technology: technology.clone(),
            },
            Request::Page { technology, path } => CacheKey::Page {
                technology: technology.clone(),
                path: normalize_path(path).to_string(),
            },
        }
    }

    /// URL of this request on a source
    #[must_use]
    pub fn url(&self, endpoints: &Endpoints) -> String {
        match self {
            Request::DocsList => endpoints.docs_list().to_string(),
            Request::Index { technology } => endpoints.index(technology),
            Request::Page { technology, path } => {
                endpoints.page(technology, normalize_path(path))
            }
        }
    }
}

/// Drop a `#fragment` suffix from a page path
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.split_once('#').map_or(path, |(page, _)| page)
}

/// Successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Raw content
    pub content: String,
    /// Source that produced it
    pub source: SourceKind,
}

/// Snapshot of the resolver for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct ResolverStatus {
    /// Active mode
    pub mode: Mode,
    /// Local source address
    pub local_url: String,
    /// Local reachability; not probed in offline mode
    pub local_available: Option<bool>,
    /// Source of the last successful resolution
    pub last_source: Option<SourceKind>,
}

struct LocalTarget {
    url: String,
    endpoints: Endpoints,
}

impl LocalTarget {
    fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            endpoints: Endpoints::local(url),
        }
    }
}

/// Multi-source resolver
pub struct Resolver {
    local: Arc<dyn Source>,
    remote: Arc<dyn Source>,
    store: Arc<dyn Store>,
    remote_endpoints: Endpoints,
    mode: RwLock<Mode>,
    local_target: RwLock<LocalTarget>,
    availability: Availability,
    last_source: RwLock<Option<SourceKind>>,
}

impl Resolver {
    /// Create a resolver in [`Mode::Auto`] targeting [`DEFAULT_LOCAL_URL`]
    pub fn new(local: Arc<dyn Source>, remote: Arc<dyn Source>, store: Arc<dyn Store>) -> Self {
        Self {
            local,
            remote,
            store,
            remote_endpoints: Endpoints::remote(),
            mode: RwLock::new(Mode::Auto),
            local_target: RwLock::new(LocalTarget::new(DEFAULT_LOCAL_URL)),
            availability: Availability::new(),
            last_source: RwLock::new(None),
        }
    }

    /// Set the initial mode
    #[must_use]
    pub fn with_mode(self, mode: Mode) -> Self {
        *self.mode.write() = mode;
        self
    }

    /// Set the initial local address
    #[must_use]
    pub fn with_local_url(self, url: &str) -> Self {
        *self.local_target.write() = LocalTarget::new(url);
        self
    }

    /// Store used for write-through
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Active mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        *self.mode.read()
    }

    /// Change mode; applies from the next resolution
    pub fn set_mode(&self, mode: Mode) {
        let previous = std::mem::replace(&mut *self.mode.write(), mode);
        tracing::info!("Source mode changed: {} -> {}", previous, mode);
    }

    /// Local source address
    #[must_use]
    pub fn local_url(&self) -> String {
        self.local_target.read().url.clone()
    }

    /// Retarget the local source; availability is probed again on next use
    pub fn set_local_url(&self, url: &str) {
        *self.local_target.write() = LocalTarget::new(url);
        self.availability.reset();
        tracing::info!("Local source set to {}", url);
    }

    /// Memoized local availability
    #[must_use]
    pub fn local_availability(&self) -> AvailabilityState {
        self.availability.state()
    }

    /// Source of the last successful resolution
    #[must_use]
    pub fn last_source(&self) -> Option<SourceKind> {
        *self.last_source.read()
    }

    /// Check whether the local source is reachable
    ///
    /// Uses the memoized answer unless `force` is set or nothing is known yet.
    pub async fn check_local_available(&self, force: bool) -> bool {
        if !force {
            if let Some(available) = self.availability.get() {
                return available;
            }
        }

        let probe_url = self.local_target.read().endpoints.docs_list().to_string();
        let available = self.local.probe(&probe_url).await;
        self.availability.set(available);
        tracing::debug!("Local source {} available: {}", probe_url, available);
        available
    }

    /// Probe the public service's catalog; not memoized
    pub async fn check_remote_available(&self) -> bool {
        self.remote.probe(self.remote_endpoints.docs_list()).await
    }

    /// Diagnostic snapshot; probes the local source unless offline
    pub async fn status(&self) -> ResolverStatus {
        let mode = self.mode();
        let local_available = if mode == Mode::Offline {
            self.availability.get()
        } else {
            Some(self.check_local_available(true).await)
        };

        ResolverStatus {
            mode,
            local_url: self.local_url(),
            local_available,
            last_source: self.last_source(),
        }
    }

    /// Resolve under the active mode
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] when no permitted source has the content
    pub async fn resolve(&self, request: &Request, force_refresh: bool) -> Result<Resolution> {
        self.resolve_with_mode(request, self.mode(), force_refresh)
            .await
    }

    /// Resolve under an explicit mode
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] when no permitted source has the content
    pub async fn resolve_with_mode(
        &self,
        request: &Request,
        mode: Mode,
        force_refresh: bool,
    ) -> Result<Resolution> {
        let key = request.cache_key();

        let resolution = match mode {
            Mode::Auto => self.resolve_auto(request, &key, force_refresh).await,
            Mode::LocalOnly => self.from_local(request, &key).await,
            Mode::RemoteOnly => self.from_remote(request, &key).await,
            Mode::Offline => self.from_store(&key).await,
        };

        match resolution {
            Some(resolution) => {
                tracing::debug!("Resolved {} from {}", key, resolution.source);
                *self.last_source.write() = Some(resolution.source);
                Ok(resolution)
            }
            None => Err(self.unavailable(mode, &key)),
        }
    }

    async fn resolve_auto(
        &self,
        request: &Request,
        key: &CacheKey,
        force_refresh: bool,
    ) -> Option<Resolution> {
        if let Some(resolution) = self.from_local(request, key).await {
            return Some(resolution);
        }

        if !force_refresh {
            if let Some(resolution) = self.from_store(key).await {
                return Some(resolution);
            }
        }

        if let Some(resolution) = self.from_remote(request, key).await {
            return Some(resolution);
        }

        // Last resort, also when the caller asked to bypass the store.
        self.from_store(key).await
    }

    async fn from_local(&self, request: &Request, key: &CacheKey) -> Option<Resolution> {
        if !self.check_local_available(false).await {
            tracing::debug!("Skipping local source for {}", key);
            return None;
        }

        let url = request.url(&self.local_target.read().endpoints);
        match self.local.fetch(&url).await {
            Ok(content) => {
                self.write_through(key, &content).await;
                Some(Resolution {
                    content,
                    source: SourceKind::Local,
                })
            }
            Err(Error::NotFound(_)) => {
                tracing::debug!("Local source has no {}", key);
                None
            }
            Err(e) => {
                tracing::debug!("Local source failed for {}: {}", key, e);
                self.availability.set(false);
                None
            }
        }
    }

    async fn from_remote(&self, request: &Request, key: &CacheKey) -> Option<Resolution> {
        let url = request.url(&self.remote_endpoints);
        match self.remote.fetch(&url).await {
            Ok(content) => {
                self.write_through(key, &content).await;
                Some(Resolution {
                    content,
                    source: SourceKind::Remote,
                })
            }
            Err(e) => {
                tracing::debug!("Remote source failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn from_store(&self, key: &CacheKey) -> Option<Resolution> {
        let content = self.store.get(key).await?;
        Some(Resolution {
            content,
            source: SourceKind::Cache,
        })
    }

    async fn write_through(&self, key: &CacheKey, content: &str) {
        if let Err(e) = self.store.put(key, content).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
    }

    fn unavailable(&self, mode: Mode, key: &CacheKey) -> Error {
        let detail = match mode {
            Mode::Auto => format!(
                "no source returned {key} (local {}, cache, remote)",
                self.local_url()
            ),
            Mode::LocalOnly => format!(
                "local server not available at {} for {key}",
                self.local_url()
            ),
            Mode::RemoteOnly => format!("remote service did not return {key}"),
            Mode::Offline => format!("{key} is not in the cache"),
        };

        Error::Unavailable {
            mode: mode.to_string(),
            detail,
        }
    }
}
