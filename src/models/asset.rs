//! Sticker asset models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Image format of a sticker asset, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Webp,
    Gif,
    Jpeg,
    Other,
}

impl AssetFormat {
    /// Map a file extension (without the dot) to a format, ignoring case.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "webp" => Self::Webp,
            "gif" => Self::Gif,
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Other,
        }
    }

    /// Derive the format from the extension of the last path segment of a URL.
    /// Query strings and fragments are ignored.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let segment = path.rsplit('/').next().unwrap_or(path);
        match segment.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Jpeg => "jpeg",
            Self::Other => "other",
        }
    }

    /// File extension used when saving an asset of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Other => "bin",
            other => other.as_str(),
        }
    }

    /// WebP and GIF stickers are treated as animated content.
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Webp | Self::Gif)
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate sticker asset found in a pack page.
///
/// Before normalization `url` holds the reference exactly as it appeared in the
/// page; afterwards it is an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateAsset {
    pub url: String,
    pub format: AssetFormat,
}

impl CandidateAsset {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let format = AssetFormat::from_url(&url);
        Self { url, format }
    }

    /// Last path segment of the URL, without query or fragment.
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.rsplit('/').next().unwrap_or(path)
    }
}
