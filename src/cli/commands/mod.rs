//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod crawl;
mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use stickercrawl::config::{load_settings_with_options, LoadOptions};

use crawl::CrawlOverrides;

#[derive(Parser)]
#[command(name = "stickercrawl")]
#[command(about = "Download sticker packs and record what was fetched")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "STICKERCRAWL_CONFIG")]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Checked before argument parsing so logging is ready first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl one or more packs into the output directory
    Crawl {
        /// Pack identifiers, e.g. `quby`
        pack_ids: Vec<String>,

        /// Crawl the built-in sample packs (in addition to any given)
        #[arg(long)]
        sample: bool,

        #[command(flatten)]
        overrides: CrawlOverrides,
    },

    /// Show what a pack page yields without downloading anything
    Inspect {
        pack_id: String,

        /// Write the fetched page body to this file
        #[arg(long)]
        save_html: Option<PathBuf>,

        #[command(flatten)]
        overrides: CrawlOverrides,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (mut settings, _config) = load_settings_with_options(options)
        .await
        .map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Crawl {
            pack_ids,
            sample,
            overrides,
        } => {
            overrides.apply(&mut settings);
            crawl::cmd_crawl(&settings, pack_ids, sample).await
        }
        Commands::Inspect {
            pack_id,
            save_html,
            overrides,
        } => {
            overrides.apply(&mut settings);
            inspect::cmd_inspect(&settings, &pack_id, save_html.as_deref()).await
        }
    }
}
