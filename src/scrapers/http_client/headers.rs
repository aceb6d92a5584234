//! Browser-like request headers.

/// Desktop Chrome user agent, so the site serves the same markup a browser gets.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Accept-Encoding is left to reqwest so it only advertises codings it decodes.
const PAGE_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

const ASSET_HEADERS: &[(&str, &str)] = &[
    ("Accept", "image/webp,image/apng,image/*,*/*;q=0.8"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Cache-Control", "no-cache"),
];

/// Which fixed header set a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Pack page HTML.
    Page,
    /// Sticker image download.
    Asset,
}

impl HeaderProfile {
    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            HeaderProfile::Page => PAGE_HEADERS,
            HeaderProfile::Asset => ASSET_HEADERS,
        }
    }
}
