//! Slot grouping and per-slot format selection.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AssetFormat, CandidateAsset, DownloadTask, PackId, SelectionPolicy};

/// Ordinal, optional `-<subindex>`, slot-eligible extension.
static ORDINAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)-?\d*\.(?:png|webp|gif)$").expect("ordinal regex should compile")
});

/// Format order for the prefer-animated policy.
const PREFERENCE: [AssetFormat; 3] = [AssetFormat::Webp, AssetFormat::Png, AssetFormat::Gif];

/// Parse the slot number from a sticker file name.
///
/// A leading copy of the pack identifier is skipped first so digits inside
/// the identifier itself (`PACK1-3.png`) are not taken as the ordinal. It is
/// only skipped when a digit does not follow, so `PACK12.png` stays 12, and
/// a name that is nothing but the identifier (`PACK1.png`) is read whole.
/// Returns `None` for names without a numeral before a PNG, WebP or GIF
/// extension.
pub fn parse_ordinal(file_name: &str, pack_id: &PackId) -> Option<u32> {
    match file_name.strip_prefix(pack_id.as_str()) {
        Some(rest) if !rest.starts_with(|c: char| c.is_ascii_digit()) => {
            ordinal_in(rest).or_else(|| ordinal_in(file_name))
        }
        _ => ordinal_in(file_name),
    }
}

fn ordinal_in(name: &str) -> Option<u32> {
    ORDINAL_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Group candidates by ordinal, keeping discovery order inside each slot.
///
/// Candidates without a parseable ordinal are dropped.
pub fn group_slots(
    candidates: &[CandidateAsset],
    pack_id: &PackId,
) -> BTreeMap<u32, Vec<CandidateAsset>> {
    let mut slots: BTreeMap<u32, Vec<CandidateAsset>> = BTreeMap::new();
    for candidate in candidates {
        if let Some(ordinal) = parse_ordinal(candidate.file_name(), pack_id) {
            slots.entry(ordinal).or_default().push(candidate.clone());
        }
    }
    slots
}

/// Turn candidates into an ordered download list.
///
/// Tasks are ascending by ordinal. Within a slot, download-all keeps
/// discovery order. The result depends only on the inputs.
pub fn select_downloads(
    candidates: &[CandidateAsset],
    policy: SelectionPolicy,
    pack_id: &PackId,
) -> Vec<DownloadTask> {
    let slots = group_slots(candidates, pack_id);
    let mut names = HashSet::new();
    let mut tasks = Vec::new();

    for (ordinal, group) in slots {
        match policy {
            SelectionPolicy::PreferAnimated => {
                let chosen = PREFERENCE
                    .iter()
                    .find_map(|format| group.iter().find(|c| c.format == *format));
                if let Some(candidate) = chosen {
                    tasks.push(task_for(candidate, ordinal, pack_id, &mut names));
                }
            }
            SelectionPolicy::DownloadAll => {
                for candidate in &group {
                    tasks.push(task_for(candidate, ordinal, pack_id, &mut names));
                }
            }
        }
    }

    tasks
}

fn task_for(
    candidate: &CandidateAsset,
    ordinal: u32,
    pack_id: &PackId,
    names: &mut HashSet<String>,
) -> DownloadTask {
    let ext = candidate.format.extension();
    let mut file_name = format!("{}-{}.{}", pack_id, ordinal, ext);
    let mut n = 2;
    while !names.insert(file_name.clone()) {
        file_name = format!("{}-{}-{}.{}", pack_id, ordinal, n, ext);
        n += 1;
    }

    DownloadTask {
        url: candidate.url.clone(),
        file_name,
        format: candidate.format,
        ordinal,
    }
}
