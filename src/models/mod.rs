//! Data models for stickercrawl.

mod asset;
mod manifest;
mod pack;
mod task;

pub use asset::{AssetFormat, CandidateAsset};
pub use manifest::{CrawlResult, ManifestLabels, PackManifest, TaskFailure};
pub use pack::{InvalidPackId, PackId};
pub use task::{DownloadTask, SelectionPolicy};
