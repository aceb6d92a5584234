//! Sticker download service.
//!
//! Runs a pack's download list one task at a time with bounded retries.
//! Separated from UI concerns - emits events for progress tracking.

mod types;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::{AssetFormat, CrawlResult, DownloadTask, PackId, TaskFailure};
use crate::scrapers::{discard_partial, Fetcher};

pub use types::{DownloadConfig, DownloadEvent, TaskOutcome};

/// Service for downloading a pack's selected stickers.
pub struct DownloadService<F: Fetcher + ?Sized> {
    fetcher: Arc<F>,
    config: DownloadConfig,
    event_tx: Option<mpsc::Sender<DownloadEvent>>,
}

impl<F: Fetcher + ?Sized> DownloadService<F> {
    /// Create a new download service.
    pub fn new(fetcher: Arc<F>, config: DownloadConfig) -> Self {
        Self {
            fetcher,
            config,
            event_tx: None,
        }
    }

    /// Report progress on `event_tx`.
    pub fn with_events(mut self, event_tx: mpsc::Sender<DownloadEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    async fn emit(&self, event: DownloadEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Download every task into `pack_dir`, in order.
    ///
    /// Individual failures are recorded and never stop the run.
    pub async fn run(&self, pack_id: &PackId, tasks: &[DownloadTask], pack_dir: &Path) -> CrawlResult {
        let mut planned_formats: BTreeMap<AssetFormat, usize> = BTreeMap::new();
        for task in tasks {
            *planned_formats.entry(task.format).or_insert(0) += 1;
        }
        let mut per_format: BTreeMap<AssetFormat, usize> = BTreeMap::new();
        let mut failures = Vec::new();

        for (index, task) in tasks.iter().enumerate() {
            self.emit(DownloadEvent::Started {
                index,
                url: task.url.clone(),
                file_name: task.file_name.clone(),
            })
            .await;

            let dest = pack_dir.join(&task.file_name);
            match self.run_task(task, &dest).await {
                TaskOutcome::Succeeded { attempts, bytes } => {
                    info!(
                        "Downloaded {} ({} bytes, {} attempt(s))",
                        task.file_name, bytes, attempts
                    );
                    *per_format.entry(task.format).or_insert(0) += 1;
                    self.emit(DownloadEvent::Completed {
                        file_name: task.file_name.clone(),
                        bytes,
                    })
                    .await;

                    if index + 1 < tasks.len() && !self.config.request_delay.is_zero() {
                        tokio::time::sleep(self.config.request_delay).await;
                    }
                }
                TaskOutcome::Failed { attempts, error } => {
                    warn!(
                        "Giving up on {} after {} attempt(s): {}",
                        task.file_name, attempts, error
                    );
                    self.emit(DownloadEvent::Failed {
                        file_name: task.file_name.clone(),
                        url: task.url.clone(),
                        attempts,
                        error: error.to_string(),
                    })
                    .await;
                    failures.push(TaskFailure {
                        file_name: task.file_name.clone(),
                        url: task.url.clone(),
                        attempts,
                        error: error.to_string(),
                    });
                }
            }
        }

        CrawlResult::new(pack_id.clone(), planned_formats, per_format, failures)
    }

    /// Attempt one task until it succeeds or attempts run out.
    pub async fn run_task(&self, task: &DownloadTask, dest: &Path) -> TaskOutcome {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("Fetching {} (attempt {}/{})", task.url, attempt, max_attempts);
            match self.fetcher.download(&task.url, dest).await {
                Ok(bytes) => {
                    return TaskOutcome::Succeeded {
                        attempts: attempt,
                        bytes,
                    }
                }
                Err(error) => {
                    discard_partial(dest).await;
                    if attempt >= max_attempts {
                        return TaskOutcome::Failed {
                            attempts: attempt,
                            error,
                        };
                    }

                    let delay = self.config.retry_delay(attempt);
                    debug!(
                        "Attempt {} for {} failed, retrying in {:?}: {}",
                        attempt, task.file_name, delay, error
                    );
                    self.emit(DownloadEvent::Retry {
                        file_name: task.file_name.clone(),
                        attempt,
                        max_attempts,
                        delay,
                        error: error.to_string(),
                    })
                    .await;
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
