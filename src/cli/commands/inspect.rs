//! Inspect command: show what each extraction stage finds on a pack page.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use console::style;

use stickercrawl::config::Settings;
use stickercrawl::models::{AssetFormat, PackId};
use stickercrawl::scrapers::HttpClient;
use stickercrawl::services::{parse_ordinal, read_manifest, PackCrawler};
use stickercrawl::utils::format_size;

pub async fn cmd_inspect(
    settings: &Settings,
    pack_id: &str,
    save_html: Option<&Path>,
) -> anyhow::Result<()> {
    let pack_id = PackId::new(pack_id)?;
    let client = Arc::new(HttpClient::new(&settings.http_config())?);
    let crawler = PackCrawler::new(client, settings.crawler_config());

    let inspection = crawler.inspect(&pack_id).await?;

    println!(
        "{} Page: {} ({})",
        style("✓").green(),
        inspection.page_url,
        format_size(inspection.body.len() as u64)
    );
    if let Some(ref content_type) = inspection.content_type {
        println!("  {} Content-Type: {}", style("→").dim(), content_type);
    }
    if let Some(length) = inspection.content_length {
        println!("  {} Declared length: {}", style("→").dim(), format_size(length));
    }

    let pack_dir = settings.output_dir.join(pack_id.as_str());
    if let Ok(previous) = read_manifest(&pack_dir).await {
        println!(
            "  {} Last crawled {}: {}/{} stickers",
            style("→").dim(),
            previous.crawled_at.format("%Y-%m-%d %H:%M"),
            previous.sticker_count,
            previous.attempted_count
        );
    }

    if let Some(path) = save_html {
        tokio::fs::write(path, &inspection.body).await?;
        println!("  {} Saved page to {}", style("→").dim(), path.display());
    }

    for (kind, found) in &inspection.scans {
        println!("{} {}: {} match(es)", style("→").cyan(), kind, found.len());
    }

    let mut seen = HashSet::new();
    let raw: Vec<_> = inspection
        .scans
        .iter()
        .flat_map(|(_, found)| found)
        .filter(|asset| seen.insert(asset.url.as_str()))
        .collect();
    let mut by_format: BTreeMap<AssetFormat, usize> = BTreeMap::new();
    for asset in &raw {
        *by_format.entry(asset.format).or_insert(0) += 1;
    }
    println!("{} {} distinct reference(s)", style("→").cyan(), raw.len());
    for (format, count) in &by_format {
        println!("  {} {}: {}", style("→").dim(), format, count);
    }
    for asset in &raw {
        println!("    [{}] {}", asset.format, asset.url);
    }

    println!(
        "{} {} candidate(s) for {} after filtering",
        style("→").cyan(),
        inspection.candidates.len(),
        pack_id
    );
    for asset in &inspection.candidates {
        match parse_ordinal(asset.file_name(), &pack_id) {
            Some(ordinal) => println!("    #{:<3} [{}] {}", ordinal, asset.format, asset.url),
            None => println!("    {} [{}] {}", style("----").dim(), asset.format, asset.url),
        }
    }

    if inspection.tasks.is_empty() {
        println!(
            "{} Nothing selectable; a crawl would fall back to guessed file names",
            style("!").yellow()
        );
    } else {
        println!(
            "{} Would download {} file(s) ({}):",
            style("✓").green(),
            inspection.tasks.len(),
            crawler.config().policy
        );
        for task in &inspection.tasks {
            println!("    {} <- {}", task.file_name, task.url);
        }
    }

    Ok(())
}
