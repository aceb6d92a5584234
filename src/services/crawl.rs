//! Pack crawl pipeline: locate, extract, select, download, record.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::download::{DownloadConfig, DownloadEvent, DownloadService};
use super::manifest::write_manifest;
use super::selection::select_downloads;
use crate::models::{
    CandidateAsset, CrawlResult, DownloadTask, InvalidPackId, ManifestLabels, PackId,
    PackManifest, SelectionPolicy,
};
use crate::scrapers::{
    AssetExtractor, Fetcher, LocateError, PageLocator, ScanKind, UrlNormalizer,
    DEFAULT_FALLBACK_COUNT, DEFAULT_PAGE_TEMPLATES,
};

/// Errors that abort a single pack crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid pack id: {0}")]
    InvalidPackId(#[from] InvalidPackId),
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings for a [`PackCrawler`].
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Site root, e.g. `https://www.sigstick.com`.
    pub base_url: String,
    /// Host that serves sticker images.
    pub asset_host: String,
    /// Pack directories are created here.
    pub output_dir: PathBuf,
    pub policy: SelectionPolicy,
    pub page_templates: Vec<String>,
    /// Size of the guessed file list used when nothing is extracted.
    pub fallback_count: u32,
    /// Pause between packs in a multi-pack crawl.
    pub pack_delay: Duration,
    pub labels: ManifestLabels,
    pub download: DownloadConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sigstick.com".to_string(),
            asset_host: "cdn.cdnstep.com".to_string(),
            output_dir: PathBuf::from("./stickers"),
            policy: SelectionPolicy::default(),
            page_templates: DEFAULT_PAGE_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            fallback_count: DEFAULT_FALLBACK_COUNT,
            pack_delay: Duration::from_millis(2000),
            labels: ManifestLabels::default(),
            download: DownloadConfig::default(),
        }
    }
}

/// Outcome of crawling one pack.
#[derive(Debug)]
pub struct CrawlReport {
    pub result: CrawlResult,
    pub pack_dir: PathBuf,
    /// Page the candidates came from, if one was found.
    pub page_url: Option<String>,
    pub used_fallback: bool,
    /// `None` when the manifest could not be written.
    pub manifest_path: Option<PathBuf>,
}

/// Diagnostic view of what a pack page yields, without downloading.
#[derive(Debug)]
pub struct PackInspection {
    pub page_url: String,
    pub content_type: Option<String>,
    /// Length the server declared, when it survived decoding.
    pub content_length: Option<u64>,
    pub body: String,
    /// Raw matches per scan, before pack filtering.
    pub scans: Vec<(ScanKind, Vec<CandidateAsset>)>,
    pub candidates: Vec<CandidateAsset>,
    pub tasks: Vec<DownloadTask>,
}

/// Crawls packs one at a time.
pub struct PackCrawler<F: Fetcher + ?Sized> {
    config: CrawlerConfig,
    fetcher: Arc<F>,
    locator: PageLocator,
    extractor: AssetExtractor,
    normalizer: UrlNormalizer,
    downloader: DownloadService<F>,
    event_tx: Option<mpsc::Sender<DownloadEvent>>,
}

impl<F: Fetcher + ?Sized> PackCrawler<F> {
    pub fn new(fetcher: Arc<F>, config: CrawlerConfig) -> Self {
        Self {
            locator: PageLocator::new(&config.base_url, config.page_templates.clone()),
            extractor: AssetExtractor::new(&config.asset_host),
            normalizer: UrlNormalizer::new(&config.base_url),
            downloader: DownloadService::new(fetcher.clone(), config.download.clone()),
            fetcher,
            config,
            event_tx: None,
        }
    }

    /// Report progress on `event_tx`.
    pub fn with_events(mut self, event_tx: mpsc::Sender<DownloadEvent>) -> Self {
        self.downloader = self.downloader.with_events(event_tx.clone());
        self.event_tx = Some(event_tx);
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    async fn emit(&self, event: DownloadEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Crawl one pack into `<output_dir>/<pack_id>/`.
    ///
    /// Only failing to create the pack directory is fatal. A missing page or
    /// an empty extraction falls back to guessed file names, and per-asset
    /// failures are recorded in the result.
    pub async fn crawl_pack(&self, pack_id: &PackId) -> Result<CrawlReport, CrawlError> {
        let pack_dir = self.config.output_dir.join(pack_id.as_str());
        tokio::fs::create_dir_all(&pack_dir)
            .await
            .map_err(|source| CrawlError::CreateDir {
                path: pack_dir.clone(),
                source,
            })?;

        let mut page_url = None;
        let mut candidates = Vec::new();
        match self.locator.locate(self.fetcher.as_ref(), pack_id).await {
            Ok(page) => {
                self.emit(DownloadEvent::PageLocated {
                    pack_id: pack_id.to_string(),
                    url: page.url.clone(),
                })
                .await;
                let raw = self.extractor.extract(&page.body, pack_id);
                candidates = self.normalizer.normalize(raw, pack_id);
                info!(
                    "Pack {}: {} candidate asset(s) from {}",
                    pack_id,
                    candidates.len(),
                    page.url
                );
                page_url = Some(page.url);
            }
            Err(e) => warn!("{}", e),
        }

        let used_fallback = candidates.is_empty();
        if used_fallback {
            candidates = self
                .locator
                .fallback_candidates(pack_id, self.config.fallback_count);
            warn!(
                "Pack {}: no stickers found, trying {} guessed file names",
                pack_id,
                candidates.len()
            );
            self.emit(DownloadEvent::FallbackUsed {
                pack_id: pack_id.to_string(),
                count: candidates.len(),
            })
            .await;
        }

        let tasks = select_downloads(&candidates, self.config.policy, pack_id);
        self.emit(DownloadEvent::Planned {
            pack_id: pack_id.to_string(),
            total: tasks.len(),
        })
        .await;

        let result = self.downloader.run(pack_id, &tasks, &pack_dir).await;
        info!(
            "Pack {}: {}/{} downloaded",
            pack_id, result.succeeded, result.attempted
        );

        let manifest = PackManifest::from_result(&result, &self.config.labels);
        let manifest_path = match write_manifest(&pack_dir, &manifest).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Pack {}: {:#}", pack_id, e);
                None
            }
        };

        Ok(CrawlReport {
            result,
            pack_dir,
            page_url,
            used_fallback,
            manifest_path,
        })
    }

    /// Crawl several packs in order, pausing between them.
    ///
    /// A failing pack does not stop the ones after it.
    pub async fn crawl_packs<S: AsRef<str>>(
        &self,
        pack_ids: &[S],
    ) -> Vec<(String, Result<CrawlReport, CrawlError>)> {
        let mut reports = Vec::with_capacity(pack_ids.len());
        for (i, raw) in pack_ids.iter().enumerate() {
            if i > 0 && !self.config.pack_delay.is_zero() {
                tokio::time::sleep(self.config.pack_delay).await;
            }

            let raw = raw.as_ref();
            let outcome = match PackId::new(raw) {
                Ok(pack_id) => self.crawl_pack(&pack_id).await,
                Err(e) => Err(CrawlError::from(e)),
            };
            reports.push((raw.to_string(), outcome));
        }
        reports
    }

    /// Locate a pack page and report what each stage finds on it.
    pub async fn inspect(&self, pack_id: &PackId) -> Result<PackInspection, LocateError> {
        let page = self.locator.locate(self.fetcher.as_ref(), pack_id).await?;
        let scans = self.extractor.extract_all(&page.body);
        let raw = self.extractor.extract(&page.body, pack_id);
        let candidates = self.normalizer.normalize(raw, pack_id);
        let tasks = select_downloads(&candidates, self.config.policy, pack_id);

        Ok(PackInspection {
            content_type: page.content_type().map(str::to_string),
            content_length: page.content_length(),
            page_url: page.url,
            body: page.body,
            scans,
            candidates,
            tasks,
        })
    }
}
