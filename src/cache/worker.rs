//! Shell request routing: network-first navigations, cache-first assets.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{AppError, Result};

use super::store::CacheStorage;

/// Versioned cache name. Bumping it makes `activate` drop older caches.
pub const CACHE_NAME: &str = "uniteam-cache-v3";

/// Shell assets pre-cached at install, relative to the app origin.
pub const SHELL_ASSETS: &[&str] = &["index.html", "manifest.json", "icon.png"];

/// How a request should be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Page load: network first, cached shell as offline fallback.
    Navigate,
    /// Everything else: cache first, network on miss.
    Asset,
}

/// A request to route through the cache.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub mode: RequestMode,
}

impl FetchRequest {
    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn asset(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Asset,
        }
    }
}

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
}

/// A routed response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub source: ResponseSource,
}

/// Offline cache worker for the app shell.
///
/// Mirrors the lifecycle of the companion web client's cache layer:
/// `install` pre-populates the versioned cache, `activate` drops caches
/// with any other name, `fetch` routes requests by mode.
pub struct CacheWorker {
    storage: CacheStorage,
    client: Client,
    base_url: String,
}

impl CacheWorker {
    /// Create a worker caching the shell served at `base_url`.
    pub fn new(storage: CacheStorage, base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            storage,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn shell_url(&self, asset: &str) -> String {
        format!("{base}/{asset}", base = self.base_url)
    }

    /// Pre-populate the named cache with the shell assets. Fails as a whole
    /// when any asset cannot be fetched.
    pub async fn install(&self) -> Result<usize> {
        let mut cache = self.storage.open(CACHE_NAME)?;

        for asset in SHELL_ASSETS {
            let url = self.shell_url(asset);
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(AppError::cache(format!(
                    "Shell asset {url} returned {status}",
                    status = response.status()
                )));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());
            let body = response.bytes().await?;
            cache.put(&url, content_type.as_deref(), &body)?;
        }

        tracing::info!("Shell cache installed: {} assets", SHELL_ASSETS.len());
        Ok(SHELL_ASSETS.len())
    }

    /// Delete every cache whose name differs from [`CACHE_NAME`]. Returns
    /// the deleted names.
    pub fn activate(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != CACHE_NAME {
                self.storage.delete(&name)?;
                tracing::info!("Deleted stale cache {name}");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Route a request per its mode.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        match request.mode {
            RequestMode::Navigate => match self.network_fetch(&request.url).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    tracing::warn!("Navigation fetch failed ({e}), trying cached shell");
                    let cache = self.storage.open(CACHE_NAME)?;
                    match cache.lookup(&self.shell_url("index.html"), true)? {
                        Some(hit) => Ok(FetchResponse {
                            body: hit.body,
                            content_type: hit.content_type,
                            source: ResponseSource::Cache,
                        }),
                        None => Err(AppError::Offline(request.url.clone())),
                    }
                }
            },
            RequestMode::Asset => {
                let cache = self.storage.open(CACHE_NAME)?;
                if let Some(hit) = cache.lookup(&request.url, false)? {
                    return Ok(FetchResponse {
                        body: hit.body,
                        content_type: hit.content_type,
                        source: ResponseSource::Cache,
                    });
                }
                self.network_fetch(&request.url).await
            }
        }
    }

    async fn network_fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await?;

        Ok(FetchResponse {
            body: body.to_vec(),
            content_type,
            source: ResponseSource::Network,
        })
    }

    /// Number of URLs currently cached under [`CACHE_NAME`].
    pub fn cached_entries(&self) -> Result<usize> {
        Ok(self.storage.open(CACHE_NAME)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn temp_storage() -> CacheStorage {
        let id = TEST_ID.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "uniteam-reports-worker-test-{}-{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        CacheStorage::new(root)
    }

    /// Serve `n` HTTP requests with a fixed body, returning the base URL.
    async fn serve(n: usize, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for _ in 0..n {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {len}\r\nconnection: close\r\n\r\n{body}",
                    len = body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    /// An origin with nothing listening: connections are refused.
    const DEAD_ORIGIN: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_install_populates_shell_cache() {
        let base = serve(SHELL_ASSETS.len(), "shell content").await;
        let worker = CacheWorker::new(temp_storage(), &base, 5);

        let count = worker.install().await.unwrap();
        assert_eq!(count, SHELL_ASSETS.len());
        assert_eq!(worker.cached_entries().unwrap(), SHELL_ASSETS.len());
    }

    #[tokio::test]
    async fn test_install_fails_when_origin_unreachable() {
        let worker = CacheWorker::new(temp_storage(), DEAD_ORIGIN, 5);
        assert!(worker.install().await.is_err());
    }

    #[tokio::test]
    async fn test_activate_deletes_other_caches() {
        let storage = temp_storage();
        storage.open("uniteam-cache-v1").unwrap();
        storage.open("uniteam-cache-v2").unwrap();
        storage.open(CACHE_NAME).unwrap();

        let worker = CacheWorker::new(storage, DEAD_ORIGIN, 5);
        let deleted = worker.activate().unwrap();

        assert_eq!(
            deleted,
            vec!["uniteam-cache-v1".to_string(), "uniteam-cache-v2".to_string()]
        );
        assert_eq!(worker.storage.keys().unwrap(), vec![CACHE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_navigation_prefers_network() {
        let base = serve(1, "live page").await;
        let storage = temp_storage();

        // A cached shell exists, but the network answer must win
        let mut cache = storage.open(CACHE_NAME).unwrap();
        cache
            .put(&format!("{base}/index.html"), Some("text/html"), b"stale shell")
            .unwrap();

        let worker = CacheWorker::new(storage, &base, 5);
        let response = worker
            .fetch(&FetchRequest::navigation(format!("{base}/index.html")))
            .await
            .unwrap();

        assert_eq!(response.source, ResponseSource::Network);
        assert_eq!(response.body, b"live page");
    }

    #[tokio::test]
    async fn test_navigation_offline_serves_cached_shell_ignoring_query() {
        let storage = temp_storage();
        let mut cache = storage.open(CACHE_NAME).unwrap();
        cache
            .put(
                &format!("{DEAD_ORIGIN}/index.html"),
                Some("text/html"),
                b"cached shell",
            )
            .unwrap();

        let worker = CacheWorker::new(storage, DEAD_ORIGIN, 5);
        let response = worker
            .fetch(&FetchRequest::navigation(format!(
                "{DEAD_ORIGIN}/index.html?source=pwa&tab=reports"
            )))
            .await
            .unwrap();

        assert_eq!(response.source, ResponseSource::Cache);
        assert_eq!(response.body, b"cached shell");
    }

    #[tokio::test]
    async fn test_navigation_offline_without_cache_fails() {
        let worker = CacheWorker::new(temp_storage(), DEAD_ORIGIN, 5);
        let result = worker
            .fetch(&FetchRequest::navigation(format!("{DEAD_ORIGIN}/index.html")))
            .await;

        assert!(matches!(result, Err(AppError::Offline(_))));
    }

    #[tokio::test]
    async fn test_asset_served_cache_first() {
        let storage = temp_storage();
        let mut cache = storage.open(CACHE_NAME).unwrap();
        let url = format!("{DEAD_ORIGIN}/icon.png");
        cache.put(&url, Some("image/png"), b"icon bytes").unwrap();

        let worker = CacheWorker::new(storage, DEAD_ORIGIN, 5);
        let response = worker.fetch(&FetchRequest::asset(url)).await.unwrap();

        assert_eq!(response.source, ResponseSource::Cache);
        assert_eq!(response.body, b"icon bytes");
    }

    #[tokio::test]
    async fn test_asset_miss_falls_through_to_network() {
        let base = serve(1, "fresh asset").await;
        let worker = CacheWorker::new(temp_storage(), &base, 5);

        let response = worker
            .fetch(&FetchRequest::asset(format!("{base}/app.js")))
            .await
            .unwrap();

        assert_eq!(response.source, ResponseSource::Network);
        assert_eq!(response.body, b"fresh asset");

        // The asset fallthrough does not write back to the cache
        assert_eq!(worker.cached_entries().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_asset_miss_offline_is_failed_load() {
        let worker = CacheWorker::new(temp_storage(), DEAD_ORIGIN, 5);
        let result = worker
            .fetch(&FetchRequest::asset(format!("{DEAD_ORIGIN}/app.js")))
            .await;

        assert!(matches!(result, Err(AppError::Http(_))));
    }
}
