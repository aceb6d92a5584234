//! Service layer for stickercrawl.
//!
//! Pipeline logic separated from UI concerns; the CLI drives it and renders
//! the events it emits.

pub mod crawl;
pub mod download;
pub mod manifest;
pub mod selection;

pub use crawl::{CrawlError, CrawlReport, CrawlerConfig, PackCrawler, PackInspection};
pub use download::{DownloadConfig, DownloadEvent, DownloadService, TaskOutcome};
pub use manifest::{read_manifest, write_manifest, MANIFEST_FILE_NAME};
pub use selection::{group_slots, parse_ordinal, select_downloads};
