//! Documentation sources
//!
//! A [`Source`] turns a URL into content. The resolver owns two of them, a
//! local DevDocs peer and the public DevDocs service, and treats the store as
//! the third. [`Endpoints`] maps logical requests onto each source's URLs.

pub mod http;

use crate::error::Result;
use serde::Serialize;
use std::fmt;

pub use http::HttpSource;

/// Default address of a local DevDocs instance
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:9292";

/// Public catalog of DevDocs
pub const REMOTE_DOCS_URL: &str = "https://devdocs.io/docs.json";

/// Public document host of DevDocs
pub const REMOTE_DOCUMENTS_URL: &str = "https://documents.devdocs.io";

/// Public page host used for links shown to users
pub const PUBLIC_SITE_URL: &str = "https://devdocs.io";

/// Which backing source produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local DevDocs peer
    Local,
    /// Persistent store
    Cache,
    /// Public DevDocs service
    Remote,
}

impl SourceKind {
    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Cache => "cache",
            SourceKind::Remote => "remote",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network source of documentation content
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Fetch the body at `url`
    ///
    /// Fails with [`crate::Error::NotFound`] when the source answers 404 and
    /// [`crate::Error::SourceUnreachable`] for transport errors or any other
    /// non-success status.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Lightweight reachability check; `true` only for a 200 answer
    async fn probe(&self, url: &str) -> bool {
        self.fetch(url).await.is_ok()
    }
}

/// URL templates of one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    docs_list: String,
    documents_base: String,
}

impl Endpoints {
    /// Endpoints of a local DevDocs instance at `base`
    #[must_use]
    pub fn local(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            docs_list: format!("{base}/docs"),
            documents_base: format!("{base}/docs"),
        }
    }

    /// Endpoints of the public DevDocs service
    #[must_use]
    pub fn remote() -> Self {
        Self {
            docs_list: REMOTE_DOCS_URL.to_string(),
            documents_base: REMOTE_DOCUMENTS_URL.to_string(),
        }
    }

    /// Catalog URL, also used as the availability probe target
    #[must_use]
    pub fn docs_list(&self) -> &str {
        &self.docs_list
    }

    /// Index URL of a technology
    #[must_use]
    pub fn index(&self, technology: &str) -> String {
        format!("{}/{technology}/index.json", self.documents_base)
    }

    /// Page URL; `path` must already be fragment-free
    #[must_use]
    pub fn page(&self, technology: &str, path: &str) -> String {
        format!("{}/{technology}/{path}.html", self.documents_base)
    }
}

/// Public URL of a page, for display
#[must_use]
pub fn public_page_url(technology: &str, path: &str) -> String {
    format!("{PUBLIC_SITE_URL}/{technology}/{path}")
}
