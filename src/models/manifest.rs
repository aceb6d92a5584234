//! Crawl outcome and the per-pack manifest written next to the stickers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssetFormat, PackId};
use crate::utils::pack_display_name;

/// A task that exhausted its attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub file_name: String,
    pub url: String,
    pub attempts: u32,
    pub error: String,
}

/// Aggregate outcome of downloading one pack's tasks.
///
/// Constructed once after every task has resolved and never mutated afterward.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub pack_id: PackId,
    pub attempted: usize,
    pub succeeded: usize,
    /// Selected assets per format, whether or not they downloaded.
    pub planned_formats: BTreeMap<AssetFormat, usize>,
    /// Successfully downloaded assets per format.
    pub per_format: BTreeMap<AssetFormat, usize>,
    /// Whether the pack offers animated stickers, judged from the plan.
    pub has_animated: bool,
    pub failures: Vec<TaskFailure>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    pub fn new(
        pack_id: PackId,
        planned_formats: BTreeMap<AssetFormat, usize>,
        per_format: BTreeMap<AssetFormat, usize>,
        failures: Vec<TaskFailure>,
    ) -> Self {
        let attempted = planned_formats.values().sum();
        let succeeded = per_format.values().sum();
        let has_animated = planned_formats
            .iter()
            .any(|(format, count)| format.is_animated() && *count > 0);
        Self {
            pack_id,
            attempted,
            succeeded,
            planned_formats,
            per_format,
            has_animated,
            failures,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Descriptive labels stamped into every manifest.
#[derive(Debug, Clone)]
pub struct ManifestLabels {
    pub source: String,
    pub category: String,
}

impl Default for ManifestLabels {
    fn default() -> Self {
        Self {
            source: "SigStick".to_string(),
            category: "general".to_string(),
        }
    }
}

/// Contents of `<output-dir>/<pack>/pack-info.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub name: String,
    pub id: String,
    pub description: String,
    pub source: String,
    pub crawled_at: DateTime<Utc>,
    pub sticker_count: usize,
    pub attempted_count: usize,
    pub category: String,
    /// Formats the pack was planned with.
    pub formats: BTreeMap<AssetFormat, usize>,
    pub downloaded_formats: BTreeMap<AssetFormat, usize>,
    pub has_animated: bool,
}

impl PackManifest {
    pub fn from_result(result: &CrawlResult, labels: &ManifestLabels) -> Self {
        Self {
            name: pack_display_name(result.pack_id.as_str()),
            id: result.pack_id.to_string(),
            description: format!("Sticker pack crawled from {}", labels.source),
            source: labels.source.clone(),
            crawled_at: result.finished_at,
            sticker_count: result.succeeded,
            attempted_count: result.attempted,
            category: labels.category.clone(),
            formats: result.planned_formats.clone(),
            downloaded_formats: result.per_format.clone(),
            has_animated: result.has_animated,
        }
    }
}
