//! Download plan models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AssetFormat;

/// How candidates sharing a slot are reduced to download tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// One task per slot: WebP, else PNG, else GIF.
    #[default]
    PreferAnimated,
    /// One task per candidate in every slot.
    DownloadAll,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreferAnimated => "prefer-animated",
            Self::DownloadAll => "download-all",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-animated" | "prefer_animated" => Ok(Self::PreferAnimated),
            "download-all" | "download_all" | "all" => Ok(Self::DownloadAll),
            other => Err(format!("unknown selection policy: {}", other)),
        }
    }
}

/// A single asset scheduled for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Absolute source URL.
    pub url: String,
    /// File name inside the pack directory, e.g. `quby-3.webp`.
    pub file_name: String,
    pub format: AssetFormat,
    /// Slot number parsed from the source file name.
    pub ordinal: u32,
}
