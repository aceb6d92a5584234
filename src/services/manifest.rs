//! Per-pack manifest file.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::models::PackManifest;

/// File name of the manifest inside each pack directory.
pub const MANIFEST_FILE_NAME: &str = "pack-info.json";

/// Write `manifest` as pretty JSON into `pack_dir`, replacing any earlier one.
pub async fn write_manifest(pack_dir: &Path, manifest: &PackManifest) -> anyhow::Result<PathBuf> {
    let path = pack_dir.join(MANIFEST_FILE_NAME);
    let json = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Read a manifest written by [`write_manifest`].
pub async fn read_manifest(pack_dir: &Path) -> anyhow::Result<PackManifest> {
    let path = pack_dir.join(MANIFEST_FILE_NAME);
    let json = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid manifest {}", path.display()))
}
