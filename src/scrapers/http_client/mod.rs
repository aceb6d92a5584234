//! HTTP client with browser-like headers and transparent body decoding.

mod headers;
mod response;
mod stream;

pub use headers::{HeaderProfile, BROWSER_USER_AGENT};
pub use response::HttpResponse;
pub use stream::{discard_partial, stream_to_path, ChunkSource};

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use super::error::FetchError;
use super::Fetcher;
use response::collect_headers;
use stream::ResponseChunks;

/// Settings for building an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Per-request deadline, covering connect, headers and body.
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// HTTP client used for both pack pages and sticker downloads.
///
/// gzip and brotli response bodies are decoded by reqwest based on the
/// `Content-Encoding` header; other codings pass through untouched.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn request(&self, url: &str, profile: HeaderProfile) -> RequestBuilder {
        profile
            .headers()
            .iter()
            .fold(self.client.get(url), |request, (name, value)| {
                request.header(*name, *value)
            })
    }

    /// Send a GET request and reject any status outside 200-299.
    pub async fn get(
        &self,
        url: &str,
        profile: HeaderProfile,
    ) -> Result<reqwest::Response, FetchError> {
        let start = Instant::now();
        let response = self
            .request(url, profile)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Fetch a page and read its decoded body as text.
    pub async fn get_text(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.get(url, HeaderProfile::Page).await?;
        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }

    /// Stream an asset to `dest`, returning the number of bytes written.
    ///
    /// A failure at any point removes whatever was written to `dest`.
    pub async fn download_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self.get(url, HeaderProfile::Asset).await?;
        let mut chunks = ResponseChunks::new(url, response);
        stream_to_path(&mut chunks, dest).await
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.get_text(url).await
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.download_to_file(url, dest).await
    }
}
