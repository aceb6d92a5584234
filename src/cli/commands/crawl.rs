//! Crawl command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tokio::sync::mpsc;

use crate::cli::progress::PackProgress;
use stickercrawl::config::{Settings, SAMPLE_PACKS};
use stickercrawl::models::SelectionPolicy;
use stickercrawl::scrapers::HttpClient;
use stickercrawl::services::{DownloadEvent, PackCrawler};
use stickercrawl::utils::format_size;

/// Settings that can be overridden per invocation.
#[derive(Debug, Clone, Default, Args)]
pub struct CrawlOverrides {
    /// Download every available format instead of one per sticker
    #[arg(long)]
    pub all_formats: bool,

    /// Directory pack folders are created in
    #[arg(short, long, env = "STICKERCRAWL_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Site root pack pages are looked up under
    #[arg(long, env = "STICKERCRAWL_BASE_URL")]
    pub base_url: Option<String>,

    /// Host serving sticker images
    #[arg(long, env = "STICKERCRAWL_ASSET_HOST")]
    pub asset_host: Option<String>,

    /// Attempts per sticker before giving up
    #[arg(long, env = "STICKERCRAWL_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Delay between successful downloads in milliseconds
    #[arg(long, env = "STICKERCRAWL_DELAY_MS")]
    pub delay_ms: Option<u64>,
}

impl CrawlOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if self.all_formats {
            settings.policy = SelectionPolicy::DownloadAll;
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref host) = self.asset_host {
            settings.asset_host = host.clone();
        }
        if let Some(attempts) = self.max_attempts {
            settings.max_attempts = attempts;
        }
        if let Some(delay) = self.delay_ms {
            settings.request_delay_ms = delay;
        }
    }
}

/// Crawl the given packs, printing per-sticker progress and a summary.
pub async fn cmd_crawl(
    settings: &Settings,
    mut pack_ids: Vec<String>,
    sample: bool,
) -> anyhow::Result<()> {
    if sample {
        for id in SAMPLE_PACKS {
            if !pack_ids.iter().any(|p| p == id) {
                pack_ids.push(id.to_string());
            }
        }
    }

    if pack_ids.is_empty() {
        println!("{} No packs given", style("!").yellow());
        println!(
            "  {} Run 'stickercrawl crawl <PACK_ID>' or 'stickercrawl crawl --sample'",
            style("→").dim()
        );
        return Ok(());
    }

    println!(
        "{} Crawling {} pack(s) into {}",
        style("→").cyan(),
        pack_ids.len(),
        settings.output_dir.display()
    );

    let client = Arc::new(HttpClient::new(&settings.http_config())?);
    let (event_tx, event_rx) = mpsc::channel::<DownloadEvent>(100);
    let crawler = PackCrawler::new(client, settings.crawler_config()).with_events(event_tx);

    let event_handler = tokio::spawn(render_events(event_rx));

    let reports = crawler.crawl_packs(pack_ids.as_slice()).await;
    drop(crawler);

    if let Err(e) = event_handler.await {
        tracing::warn!("Event handler task failed: {}", e);
    }

    let mut fatal = 0usize;
    let mut total_files = 0usize;
    for (pack_id, outcome) in &reports {
        match outcome {
            Ok(report) => {
                let result = &report.result;
                total_files += result.succeeded;
                let marker = if result.succeeded == 0 || result.failed() > 0 {
                    style("!").yellow()
                } else {
                    style("✓").green()
                };
                println!(
                    "{} {}: {}/{} stickers",
                    marker, pack_id, result.succeeded, result.attempted
                );
                for (format, count) in &result.per_format {
                    println!("  {} {}: {}", style("→").dim(), format, count);
                }
                if report.used_fallback {
                    println!("  {} used guessed file names", style("→").dim());
                }
                if let Some(ref path) = report.manifest_path {
                    println!("  {} {}", style("→").dim(), path.display());
                }
            }
            Err(e) => {
                fatal += 1;
                eprintln!("{} {}: {}", style("✗").red(), pack_id, e);
            }
        }
    }

    println!(
        "{} Downloaded {} sticker(s) across {} pack(s)",
        style("✓").green(),
        total_files,
        reports.len() - fatal
    );

    if fatal == reports.len() {
        anyhow::bail!("every pack failed");
    }
    Ok(())
}

/// Render crawl events until the sender side closes.
async fn render_events(mut event_rx: mpsc::Receiver<DownloadEvent>) {
    let mut progress: Option<PackProgress> = None;
    let mut total_bytes = 0u64;

    while let Some(event) = event_rx.recv().await {
        match event {
            DownloadEvent::PageLocated { pack_id, url } => {
                println!("{} {}: found {}", style("→").cyan(), pack_id, url);
            }
            DownloadEvent::FallbackUsed { pack_id, count } => {
                println!(
                    "{} {}: no stickers found on page, trying {} guessed file names",
                    style("!").yellow(),
                    pack_id,
                    count
                );
            }
            DownloadEvent::Planned { pack_id, total } => {
                if let Some(previous) = progress.take() {
                    previous.finish();
                }
                progress = Some(PackProgress::new(&pack_id, total));
            }
            DownloadEvent::Started { file_name, .. } => {
                if let Some(ref p) = progress {
                    p.start_task(&file_name);
                }
            }
            DownloadEvent::Retry {
                file_name,
                attempt,
                max_attempts,
                delay,
                error,
            } => {
                let line = format!(
                    "  {} {} attempt {}/{} failed, retrying in {:?}: {}",
                    style("!").yellow(),
                    file_name,
                    attempt,
                    max_attempts,
                    delay,
                    error
                );
                match progress {
                    Some(ref p) => p.println(&line),
                    None => eprintln!("{}", line),
                }
            }
            DownloadEvent::Completed { bytes, .. } => {
                total_bytes += bytes;
                if let Some(ref p) = progress {
                    p.finish_task();
                }
            }
            DownloadEvent::Failed {
                file_name,
                url,
                attempts,
                error,
            } => {
                let line = format!(
                    "  {} {} ({}) failed after {} attempt(s): {}",
                    style("✗").red(),
                    file_name,
                    url,
                    attempts,
                    error
                );
                match progress {
                    Some(ref p) => {
                        p.println(&line);
                        p.finish_task();
                    }
                    None => eprintln!("{}", line),
                }
            }
        }
    }

    if let Some(p) = progress {
        p.finish();
    }
    if total_bytes > 0 {
        println!("{} {} written", style("→").dim(), format_size(total_bytes));
    }
}
