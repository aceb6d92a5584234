//! URL resolution, deduplication and sticker filtering.

use std::collections::HashSet;

use url::Url;

use crate::models::{AssetFormat, CandidateAsset, PackId};

/// Substring marking thumbnail variants.
pub const THUMBNAIL_MARKER: &str = ".thumb";
/// Substring marking pack cover art.
pub const COVER_MARKER: &str = "cover-";

/// Resolves raw references against the site and keeps only sticker assets.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    base_url: String,
}

impl UrlNormalizer {
    /// `base_url` is the scheme and host that root-relative and bare relative
    /// references are joined to, e.g. `https://www.sigstick.com`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a reference to an absolute URL string.
    pub fn resolve(&self, reference: &str) -> String {
        if let Some(rest) = reference.strip_prefix("//") {
            format!("https://{}", rest)
        } else if reference.starts_with('/') {
            format!("{}{}", self.base_url, reference)
        } else if !reference.starts_with("http") {
            format!("{}/{}", self.base_url, reference)
        } else {
            reference.to_string()
        }
    }

    /// Resolve every reference and drop repeats, keeping first-seen order.
    pub fn resolve_all(&self, raw: Vec<CandidateAsset>) -> Vec<CandidateAsset> {
        let mut seen = HashSet::new();
        raw.into_iter()
            .map(|asset| CandidateAsset::new(self.resolve(&asset.url)))
            .filter(|asset| seen.insert(asset.url.clone()))
            .collect()
    }

    /// Resolve, deduplicate and filter raw references down to this pack's stickers.
    ///
    /// Thumbnails, cover art, unknown formats and URLs whose path does not
    /// contain the pack identifier (case-sensitive) are dropped.
    pub fn normalize(&self, raw: Vec<CandidateAsset>, pack_id: &PackId) -> Vec<CandidateAsset> {
        self.resolve_all(raw)
            .into_iter()
            .filter(|asset| is_sticker_asset(asset, pack_id))
            .collect()
    }
}

/// Whether a resolved candidate is a full-size sticker belonging to the pack.
pub fn is_sticker_asset(asset: &CandidateAsset, pack_id: &PackId) -> bool {
    if asset.format == AssetFormat::Other {
        return false;
    }
    if asset.url.contains(THUMBNAIL_MARKER) || asset.url.contains(COVER_MARKER) {
        return false;
    }
    if Url::parse(&asset.url).is_err() {
        return false;
    }
    raw_path(&asset.url).contains(pack_id.as_str())
}

/// The path of an absolute URL string as written, before any percent-encoding.
///
/// `Url::path` encodes non-ASCII text, which would never match the identifier.
fn raw_path(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    let path = after_scheme.find('/').map_or("", |i| &after_scheme[i..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
