//! HTTP source backed by reqwest

use crate::error::{Error, Result};
use crate::utils::HttpClientBuilder;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Timeout of the local peer
pub const LOCAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout of the public service
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP source
pub struct HttpSource {
    client: Client,
    name: &'static str,
}

impl HttpSource {
    /// Wrap an existing client
    #[must_use]
    pub fn with_client(name: &'static str, client: Client) -> Self {
        Self { client, name }
    }

    /// Source for a local DevDocs peer
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn local(timeout: Duration) -> Result<Self> {
        let client = HttpClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .build()?;
        Ok(Self::with_client("local", client))
    }

    /// Source for the public DevDocs service
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn remote(timeout: Duration) -> Result<Self> {
        let client = HttpClientBuilder::new().timeout(timeout).build()?;
        Ok(Self::with_client("remote", client))
    }
}

#[async_trait::async_trait]
impl super::Source for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("{} GET {}", self.name, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::SourceUnreachable(format!("{url}: {e}")))?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| Error::SourceUnreachable(format!("{url}: {e}"))),
            StatusCode::NOT_FOUND => Err(Error::NotFound(url.to_string())),
            status => Err(Error::SourceUnreachable(format!("{url}: HTTP {status}"))),
        }
    }

    async fn probe(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::debug!("{} probe of {} failed: {}", self.name, url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::resolver::availability::AvailabilityState;
    use crate::resolver::{Mode, Request, Resolver};
    use crate::source::Source;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PAGE: &str = "<h1>hello</h1>";

    /// Serve canned responses picked by request path; returns the base URL
    async fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = if path.contains("missing") {
                        ("404 Not Found", "no such page")
                    } else if path.contains("broken") {
                        ("500 Internal Server Error", "boom")
                    } else {
                        ("200 OK", PAGE)
                    };

                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}")
    }

    /// Base URL of a port nothing listens on
    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn source() -> HttpSource {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpSource::with_client("test", client)
    }

    #[test]
    fn test_constructors_build_clients() {
        assert!(HttpSource::local(LOCAL_TIMEOUT).is_ok());
        assert!(HttpSource::remote(REMOTE_TIMEOUT).is_ok());
    }

    #[tokio::test]
    async fn test_ok_returns_body() {
        let base = serve().await;
        let source = source();

        let body = source.fetch(&format!("{base}/docs/rust/std.html")).await.unwrap();
        assert_eq!(body, PAGE);
        assert!(source.probe(&format!("{base}/docs")).await);
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let base = serve().await;
        let source = source();
        let url = format!("{base}/docs/rust/missing.html");

        match source.fetch(&url).await {
            Err(Error::NotFound(reported)) => assert_eq!(reported, url),
            other => panic!("expected not found, got {other:?}"),
        }
        assert!(!source.probe(&url).await);
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let base = serve().await;
        let source = source();
        let url = format!("{base}/docs/rust/broken.html");

        match source.fetch(&url).await {
            Err(Error::SourceUnreachable(detail)) => {
                assert!(detail.contains(&url));
                assert!(detail.contains("500"));
            }
            other => panic!("expected unreachable, got {other:?}"),
        }
        assert!(!source.probe(&url).await);
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let base = closed_port().await;
        let source = source();
        let url = format!("{base}/docs");

        assert!(matches!(
            source.fetch(&url).await,
            Err(Error::SourceUnreachable(_))
        ));
        assert!(!source.probe(&url).await);
    }

    #[tokio::test]
    async fn test_local_availability_follows_http_status() {
        let base = serve().await;
        let resolver = Resolver::new(
            Arc::new(source()),
            Arc::new(source()),
            Arc::new(MemoryStore::new()),
        )
        .with_mode(Mode::LocalOnly)
        .with_local_url(&base);

        let hit = resolver
            .resolve(&Request::page("python~3.12", "library/asyncio"), false)
            .await
            .unwrap();
        assert_eq!(hit.content, PAGE);

        // A 404 is a content miss; the server stays usable.
        let missing = Request::page("python~3.12", "library/missing");
        assert!(resolver.resolve(&missing, false).await.is_err());
        assert_eq!(resolver.local_availability(), AvailabilityState::Available);

        // A 500 marks the server unavailable until it is checked again.
        let broken = Request::page("python~3.12", "library/broken");
        assert!(resolver.resolve(&broken, false).await.is_err());
        assert_eq!(resolver.local_availability(), AvailabilityState::Unavailable);

        let skipped = Request::page("python~3.12", "library/json");
        assert!(resolver.resolve(&skipped, false).await.is_err());

        assert!(resolver.check_local_available(true).await);
        assert_eq!(resolver.local_availability(), AvailabilityState::Available);
    }
}
