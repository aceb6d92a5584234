//! Pack page location and the synthetic fallback list.

use thiserror::Error;
use tracing::{debug, info};

use super::http_client::HttpResponse;
use super::Fetcher;
use crate::models::{CandidateAsset, PackId};

/// Page path templates tried in order.
///
/// Placeholders: `{base}`, `{id}`, `{id_lower}`, `{id_upper}`.
pub const DEFAULT_PAGE_TEMPLATES: &[&str] = &[
    "{base}/pack/{id}",
    "{base}/pack/{id_lower}",
    "{base}/pack/{id_upper}",
    "{base}/sticker-pack/{id}",
    "{base}/stickers/{id}",
    "{base}/{id}",
];

/// Number of guessed file names in the fallback list.
pub const DEFAULT_FALLBACK_COUNT: u32 = 10;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no page found for pack {pack_id} after trying {tried} locations")]
    NotFound { pack_id: String, tried: usize },
}

/// Finds a pack's page by trying URL templates against a fetcher.
#[derive(Debug, Clone)]
pub struct PageLocator {
    base_url: String,
    templates: Vec<String>,
}

impl PageLocator {
    pub fn new(base_url: &str, templates: Vec<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            templates,
        }
    }

    /// Locator using [`DEFAULT_PAGE_TEMPLATES`].
    pub fn with_default_templates(base_url: &str) -> Self {
        Self::new(
            base_url,
            DEFAULT_PAGE_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        )
    }

    /// Expand every template for a pack, dropping URLs already listed.
    pub fn page_urls(&self, pack_id: &PackId) -> Vec<String> {
        let id = pack_id.as_str();
        let mut urls: Vec<String> = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            let url = template
                .replace("{base}", &self.base_url)
                .replace("{id_lower}", &id.to_lowercase())
                .replace("{id_upper}", &id.to_uppercase())
                .replace("{id}", id);
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// Return the first page that fetches successfully.
    ///
    /// Failures fall through to the next location; nothing after the first
    /// success is requested.
    pub async fn locate<F: Fetcher + ?Sized>(
        &self,
        fetcher: &F,
        pack_id: &PackId,
    ) -> Result<HttpResponse, LocateError> {
        let urls = self.page_urls(pack_id);
        for url in &urls {
            debug!("Trying pack page {}", url);
            match fetcher.fetch_page(url).await {
                Ok(page) => {
                    info!("Found pack {} at {}", pack_id, url);
                    return Ok(page);
                }
                Err(e) => debug!("Pack page unavailable: {}", e),
            }
        }

        Err(LocateError::NotFound {
            pack_id: pack_id.to_string(),
            tried: urls.len(),
        })
    }

    /// Guessed sequential sticker URLs used when no real candidates were found.
    pub fn fallback_candidates(&self, pack_id: &PackId, count: u32) -> Vec<CandidateAsset> {
        (1..=count)
            .map(|n| {
                CandidateAsset::new(format!(
                    "{}/stickers/{}/sticker-{}.png",
                    self.base_url, pack_id, n
                ))
            })
            .collect()
    }
}
