//! stickercrawl - sticker pack crawler.
//!
//! Locates a pack's page, pulls sticker URLs out of its markup, picks one
//! file per sticker and downloads them with bounded retries, then writes a
//! `pack-info.json` manifest next to the files.

pub mod config;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod utils;
