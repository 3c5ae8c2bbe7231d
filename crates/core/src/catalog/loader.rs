//! # Catalog Loader
//!
//! Fetches the store index document once and parses it into a [`Catalog`].
//! No retry is performed here; retry policy belongs to the caller.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::model::{parse_catalog, Catalog};
use crate::error::LoadError;

/// Path of the store index document on the catalog host
pub const CATALOG_PATH: &str = "/store/index.json";

/// Default catalog endpoint
pub const DEFAULT_CATALOG_URL: &str = "http://127.0.0.1:3000/store/index.json";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the raw catalog document comes from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Read the raw document. Called once per load.
    async fn fetch(&self) -> Result<String, LoadError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// HTTP GET against a fixed URL
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A JSON document on local disk
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// A document held in memory
pub struct StaticCatalogSource {
    body: String,
}

impl StaticCatalogSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        Ok(self.body.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Loads the catalog from a single source
pub struct CatalogLoader {
    source: Box<dyn CatalogSource>,
}

impl CatalogLoader {
    pub fn new(source: impl CatalogSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn source(&self) -> &dyn CatalogSource {
        self.source.as_ref()
    }

    /// Fetch and parse the catalog. Order of the document is preserved.
    pub async fn load(&self) -> Result<Catalog, LoadError> {
        let location = self.source.describe();

        let result = match self.source.fetch().await {
            Ok(body) => parse_catalog(&body),
            Err(e) => Err(e),
        };

        match &result {
            Ok(catalog) => {
                tracing::info!("Loaded {} apps from {}", catalog.len(), location)
            }
            Err(e) => tracing::warn!("Error loading store from {}: {}", location, e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const INDEX: &str = r#"[
        {"name": "Calculator", "icon": "c.png", "data": {"desc": "Math", "feat": "Add\nSubtract"}},
        {"name": "Notepad", "icon": "n.png", "data": {"desc": "Text", "feat": "Edit"}}
    ]"#;

    /// Serve exactly one HTTP response on a local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn index_url(base: &str) -> String {
        format!("{}{}", base, CATALOG_PATH)
    }

    #[test]
    fn test_static_source_loads() {
        let loader = CatalogLoader::new(StaticCatalogSource::new(INDEX));
        let catalog = tokio_test::block_on(loader.load()).unwrap();
        assert_eq!(catalog.names(), vec!["Calculator", "Notepad"]);
    }

    #[test]
    fn test_parse_failure_is_load_error() {
        let loader = CatalogLoader::new(StaticCatalogSource::new("<html>oops</html>"));
        let result = tokio_test::block_on(loader.load());
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let loader = CatalogLoader::new(FileCatalogSource::new(
            ".storefront/does_not_exist_index.json",
        ));
        assert!(matches!(loader.load().await, Err(LoadError::Io { .. })));
    }

    #[tokio::test]
    async fn test_http_source_fetches_index() {
        let base = serve_once("HTTP/1.1 200 OK", INDEX).await;
        let source = HttpCatalogSource::new(index_url(&base), Duration::from_secs(5)).unwrap();
        assert!(source.describe().ends_with(CATALOG_PATH));

        let catalog = CatalogLoader::new(source).load().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.apps()[1].features, vec!["Edit"]);
    }

    #[tokio::test]
    async fn test_http_error_status_is_load_error() {
        let base = serve_once("HTTP/1.1 404 Not Found", "").await;
        let source = HttpCatalogSource::new(index_url(&base), Duration::from_secs(5)).unwrap();

        match CatalogLoader::new(source).load().await {
            Err(LoadError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_load_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpCatalogSource::new(format!("http://{}/store/index.json", addr), Duration::from_secs(2))
                .unwrap();
        assert!(matches!(
            CatalogLoader::new(source).load().await,
            Err(LoadError::Transport(_))
        ));
    }
}
