//! Byte sources for texture maps: HTTP via reqwest, local files via tokio.

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("connection error for {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Protocol { url: String, status: u16 },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches the raw (still encoded) bytes behind a URL.
pub trait TextureFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Plain `GET <url>`; no headers, auth or retries.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl TextureFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let connection = |source| FetchError::Connection {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(connection)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Protocol {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(connection)?;
        Ok(bytes.to_vec())
    }
}

/// `http(s)://` goes over the network; `file://` URLs and bare paths are read
/// from disk.
#[derive(Clone, Debug, Default)]
pub struct SourceFetcher {
    http: HttpFetcher,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl TextureFetcher for SourceFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if is_http(url) {
            return self.http.fetch(url).await;
        }
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        tokio::fs::read(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })
    }
}
