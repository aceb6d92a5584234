//! Candidate asset extraction from raw pack page text.
//!
//! The page is treated as opaque text. Several independent scans each look for
//! a different way an asset reference can be embedded (bare CDN URLs, `<img>`
//! attributes, quoted script literals, JSON `"url"` keys). Their outputs are
//! concatenated without deduplication; the same asset usually shows up more
//! than once and is collapsed later by the normalizer.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CandidateAsset, PackId};

static IMG_SRC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']*\.(?:png|jpg|jpeg|gif|webp))[^"']*["'][^>]*>"#)
        .expect("img src regex should compile")
});

static QUOTED_LITERAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']([^"']*\.(?:png|jpg|jpeg|gif|webp))[^"']*["']"#)
        .expect("quoted literal regex should compile")
});

static JSON_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"url":\s*["']([^"']*\.(?:png|jpg|jpeg|gif|webp))["']"#)
        .expect("json url regex should compile")
});

/// Quoted literals this short are not plausible asset paths.
const MIN_LITERAL_LEN: usize = 10;

/// The independent scans run over a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Absolute `https://<asset-host>/<dir>/<file>.<ext>` URLs anywhere in the text.
    CdnUrl,
    /// `src` attributes of `<img>` tags.
    ImgSrc,
    /// Any quoted string ending in an image extension.
    QuotedLiteral,
    /// Values of `"url": "..."` keys.
    JsonUrl,
}

impl ScanKind {
    pub const ALL: [ScanKind; 4] = [
        ScanKind::CdnUrl,
        ScanKind::ImgSrc,
        ScanKind::QuotedLiteral,
        ScanKind::JsonUrl,
    ];
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanKind::CdnUrl => write!(f, "cdn-url"),
            ScanKind::ImgSrc => write!(f, "img-src"),
            ScanKind::QuotedLiteral => write!(f, "quoted-literal"),
            ScanKind::JsonUrl => write!(f, "json-url"),
        }
    }
}

/// Extracts candidate sticker references pointing at one asset host.
pub struct AssetExtractor {
    asset_host: String,
    cdn_pattern: Regex,
}

impl AssetExtractor {
    pub fn new(asset_host: &str) -> Self {
        let cdn_pattern = Regex::new(&format!(
            r#"(?i)https://{}/[^/\s"'<>]+/[^/\s"'<>]+\.(?:png|jpg|jpeg|gif|webp)"#,
            regex::escape(asset_host)
        ))
        .expect("escaped host regex should compile");

        Self {
            asset_host: asset_host.to_string(),
            cdn_pattern,
        }
    }

    /// Run one scan over the page text.
    pub fn scan(&self, kind: ScanKind, text: &str) -> Vec<CandidateAsset> {
        match kind {
            ScanKind::CdnUrl => self
                .cdn_pattern
                .find_iter(text)
                .map(|m| CandidateAsset::new(m.as_str()))
                .collect(),
            ScanKind::ImgSrc => self.captured(&IMG_SRC_PATTERN, text, 0),
            ScanKind::QuotedLiteral => self.captured(&QUOTED_LITERAL_PATTERN, text, MIN_LITERAL_LEN),
            ScanKind::JsonUrl => self.captured(&JSON_URL_PATTERN, text, 0),
        }
    }

    /// Group-1 captures that mention the asset host and exceed `min_len`.
    fn captured(&self, pattern: &Regex, text: &str, min_len: usize) -> Vec<CandidateAsset> {
        pattern
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .filter(|reference| reference.len() > min_len && reference.contains(&self.asset_host))
            .map(CandidateAsset::new)
            .collect()
    }

    /// Every scan's raw output, in scan order, without any pack filtering.
    pub fn extract_all(&self, text: &str) -> Vec<(ScanKind, Vec<CandidateAsset>)> {
        ScanKind::ALL
            .iter()
            .map(|kind| (*kind, self.scan(*kind, text)))
            .collect()
    }

    /// Union of all scans, keeping only references that mention `pack_id`.
    ///
    /// Never fails; a page with no matches yields an empty list.
    pub fn extract(&self, text: &str, pack_id: &PackId) -> Vec<CandidateAsset> {
        self.extract_all(text)
            .into_iter()
            .flat_map(|(_, found)| found)
            .filter(|asset| asset.url.contains(pack_id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetFormat;

    fn extractor() -> AssetExtractor {
        AssetExtractor::new("cdn.example.com")
    }

    fn urls(found: &[CandidateAsset]) -> Vec<&str> {
        found.iter().map(|a| a.url.as_str()).collect()
    }

    #[test]
    fn test_cdn_scan_finds_bare_urls() {
        let text = "var a = https://cdn.example.com/PACK1/PACK1-3.png; b=https://cdn.example.com/PACK1/PACK1-3.WEBP";
        let found = extractor().scan(ScanKind::CdnUrl, text);
        assert_eq!(
            urls(&found),
            vec![
                "https://cdn.example.com/PACK1/PACK1-3.png",
                "https://cdn.example.com/PACK1/PACK1-3.WEBP"
            ]
        );
        assert_eq!(found[1].format, AssetFormat::Webp);
    }

    #[test]
    fn test_cdn_scan_ignores_other_hosts() {
        let text = "https://img.other.com/PACK1/PACK1-1.png";
        assert!(extractor().scan(ScanKind::CdnUrl, text).is_empty());
    }

    #[test]
    fn test_img_src_scan() {
        let text = r#"<div><img class="s" src="//cdn.example.com/PACK1/2.gif" alt="x"></div>"#;
        let found = extractor().scan(ScanKind::ImgSrc, text);
        assert_eq!(urls(&found), vec!["//cdn.example.com/PACK1/2.gif"]);
    }

    #[test]
    fn test_quoted_literal_scan_requires_plausible_length() {
        let extractor = AssetExtractor::new("c.io");
        let text = r#"x = 'c.io/a.png'; y = "https://c.io/PACK1/4.webp""#;
        let found = extractor.scan(ScanKind::QuotedLiteral, text);
        assert_eq!(urls(&found), vec!["https://c.io/PACK1/4.webp"]);
    }

    #[test]
    fn test_json_url_scan() {
        let text = r#"{"stickers":[{"url": "https://cdn.example.com/PACK1/5.png"}]}"#;
        let found = extractor().scan(ScanKind::JsonUrl, text);
        assert_eq!(urls(&found), vec!["https://cdn.example.com/PACK1/5.png"]);
    }

    #[test]
    fn test_extract_keeps_duplicates_across_scans() {
        let text = r#"<img src="https://cdn.example.com/PACK1/PACK1-1.png">"#;
        let pack = PackId::new("PACK1").unwrap();
        let found = extractor().extract(text, &pack);
        // cdn-url, img-src and quoted-literal all see the same reference
        assert_eq!(found.len(), 3);
        assert!(found
            .iter()
            .all(|a| a.url == "https://cdn.example.com/PACK1/PACK1-1.png"));
    }

    #[test]
    fn test_extract_filters_other_packs() {
        let text = "https://cdn.example.com/OTHER/OTHER-1.png https://cdn.example.com/PACK1/PACK1-2.png";
        let pack = PackId::new("PACK1").unwrap();
        let found = extractor().extract(text, &pack);
        assert_eq!(urls(&found), vec!["https://cdn.example.com/PACK1/PACK1-2.png"]);
    }

    #[test]
    fn test_extract_empty_page() {
        let pack = PackId::new("PACK1").unwrap();
        assert!(extractor().extract("<html></html>", &pack).is_empty());
    }

    #[test]
    fn test_host_is_escaped() {
        // The dot in the host must not match arbitrary characters
        let text = "https://cdnXexample.com/PACK1/1.png";
        assert!(extractor().scan(ScanKind::CdnUrl, text).is_empty());
    }
}
