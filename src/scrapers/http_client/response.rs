//! HTTP response wrapper.

use std::collections::HashMap;

use reqwest::StatusCode;

/// A fully read, successfully fetched page.
///
/// The body has already had any gzip or brotli content-coding removed.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Get the Content-Length header.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("content-length")
            .and_then(|s| s.parse().ok())
    }
}

/// Collect response headers into a lowercase-keyed map, skipping non-UTF-8 values.
pub(crate) fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let mut collected = HashMap::new();
    for (name, value) in headers {
        if let Ok(v) = value.to_str() {
            collected.insert(name.to_string(), v.to_string());
        }
    }
    collected
}
