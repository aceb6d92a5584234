//! Fetching and parsing pack pages.

pub mod error;
pub mod extract;
mod http_client;
pub mod locate;
pub mod normalize;

pub use error::{FetchError, TransportReason};
pub use extract::{AssetExtractor, ScanKind};
pub use http_client::{
    discard_partial, stream_to_path, ChunkSource, HeaderProfile, HttpClient, HttpConfig,
    HttpResponse, BROWSER_USER_AGENT,
};
pub use locate::{LocateError, PageLocator, DEFAULT_FALLBACK_COUNT, DEFAULT_PAGE_TEMPLATES};
pub use normalize::{is_sticker_asset, UrlNormalizer};

use std::path::Path;

use async_trait::async_trait;

/// Outbound request seam shared by the page locator and the downloader.
///
/// [`HttpClient`] is the live implementation; tests substitute scripted ones.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page and return its decoded body.
    async fn fetch_page(&self, url: &str) -> Result<HttpResponse, FetchError>;

    /// Stream an asset to `dest`, returning bytes written.
    ///
    /// Implementations must not leave a file at `dest` on failure.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}
