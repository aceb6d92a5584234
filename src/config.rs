//! Configuration management for stickercrawl using the prefer crate.
//!
//! Resolution order, lowest to highest: built-in defaults, config file
//! (explicit `--config` or discovered by prefer), then `STICKERCRAWL_*`
//! environment variables and command-line flags, which the CLI applies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{ManifestLabels, SelectionPolicy};
use crate::scrapers::{HttpConfig, BROWSER_USER_AGENT, DEFAULT_FALLBACK_COUNT, DEFAULT_PAGE_TEMPLATES};
use crate::services::{CrawlerConfig, DownloadConfig};

/// Name prefer searches for (`stickercrawl.toml`, `stickercrawl.yaml`, ...).
pub const CONFIG_NAME: &str = "stickercrawl";

pub const DEFAULT_BASE_URL: &str = "https://www.sigstick.com";
pub const DEFAULT_ASSET_HOST: &str = "cdn.cdnstep.com";
pub const DEFAULT_OUTPUT_DIR: &str = "./stickers";

/// Packs crawled by `crawl --sample`.
pub const SAMPLE_PACKS: &[&str] = &["quby", "cute-animals", "emotions", "food", "nature"];

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Pack directories are created here.
    pub output_dir: PathBuf,
    pub base_url: String,
    /// Host serving sticker images; extraction only keeps URLs on it.
    pub asset_host: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay after each successful download in milliseconds.
    pub request_delay_ms: u64,
    /// Delay between packs in milliseconds.
    pub pack_delay_ms: u64,
    pub max_attempts: u32,
    /// Retry `n` waits `n * retry_base_delay_ms`.
    pub retry_base_delay_ms: u64,
    pub policy: SelectionPolicy,
    pub page_templates: Vec<String>,
    pub fallback_count: u32,
    pub source_label: String,
    pub category: String,
}

impl Default for Settings {
    fn default() -> Self {
        let labels = ManifestLabels::default();
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            asset_host: DEFAULT_ASSET_HOST.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            request_timeout: 15,
            request_delay_ms: 1000,
            pack_delay_ms: 2000,
            max_attempts: 3,
            retry_base_delay_ms: 1000,
            policy: SelectionPolicy::default(),
            page_templates: DEFAULT_PAGE_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            fallback_count: DEFAULT_FALLBACK_COUNT,
            source_label: labels.source,
            category: labels.category,
        }
    }
}

impl Settings {
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.request_timeout),
        }
    }

    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            max_attempts: self.max_attempts,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }

    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            asset_host: self.asset_host.clone(),
            output_dir: self.output_dir.clone(),
            policy: self.policy,
            page_templates: self.page_templates.clone(),
            fallback_count: self.fallback_count,
            pack_delay: Duration::from_millis(self.pack_delay_ms),
            labels: ManifestLabels {
                source: self.source_label.clone(),
                category: self.category.clone(),
            },
            download: self.download_config(),
        }
    }
}

/// On-disk configuration. Every field is optional and overrides the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "target")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_base_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub page_templates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a config file with prefer; defaults if there is none.
    ///
    /// A discovered file that fails to parse is reported and ignored.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Parse a config file, choosing the format from its extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.selection_policy()?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// The configured selection policy, if one is set.
    pub fn selection_policy(&self) -> Result<Option<SelectionPolicy>, String> {
        self.policy.as_deref().map(str::parse::<SelectionPolicy>).transpose()
    }

    /// Directory containing the loaded config file.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref asset_host) = self.asset_host {
            settings.asset_host = asset_host.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(delay) = self.pack_delay_ms {
            settings.pack_delay_ms = delay;
        }
        if let Some(attempts) = self.max_attempts {
            settings.max_attempts = u32::try_from(attempts).unwrap_or(u32::MAX);
        }
        if let Some(delay) = self.retry_base_delay_ms {
            settings.retry_base_delay_ms = delay;
        }
        if let Ok(Some(policy)) = self.selection_policy() {
            settings.policy = policy;
        }
        if !self.page_templates.is_empty() {
            settings.page_templates = self.page_templates.clone();
        }
        if let Some(count) = self.fallback_count {
            settings.fallback_count = u32::try_from(count).unwrap_or(u32::MAX);
        }
        if let Some(ref label) = self.source_label {
            settings.source_label = label.clone();
        }
        if let Some(ref category) = self.category {
            settings.category = category.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file; must exist and parse.
    pub config_path: Option<PathBuf>,
    /// Resolve relative paths against the working directory instead of the
    /// config file's directory.
    pub use_cwd: bool,
}

/// Load the config file and resolve it over the defaults.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), String> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd
    } else {
        config.base_dir().unwrap_or(cwd)
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, "https://www.sigstick.com");
        assert_eq!(settings.asset_host, "cdn.cdnstep.com");
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.page_templates.len(), 6);
        assert_eq!(settings.policy, SelectionPolicy::PreferAnimated);

        let download = settings.download_config();
        assert_eq!(download.retry_delay(2), Duration::from_millis(2000));
        assert_eq!(settings.http_config().timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "stickercrawl.toml",
            r#"
output_dir = "out"
max_attempts = 5
policy = "download-all"
page_templates = ["{base}/p/{id}"]
"#,
        )
        .await;

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.max_attempts, Some(5));
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, dir.path());
        assert_eq!(settings.output_dir, dir.path().join("out"));
        assert_eq!(settings.policy, SelectionPolicy::DownloadAll);
        assert_eq!(settings.page_templates, vec!["{base}/p/{id}".to_string()]);
        assert_eq!(settings.request_delay_ms, 1000);
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = write_config(dir.path(), "c.yaml", "asset_host: cdn.test\nfallback_count: 4\n").await;
        let json = write_config(dir.path(), "c.json", r#"{"base_url": "http://localhost:9"}"#).await;

        let yaml = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(yaml.asset_host.as_deref(), Some("cdn.test"));
        assert_eq!(yaml.fallback_count, Some(4));

        let json = Config::load_from_path(&json).await.unwrap();
        assert_eq!(json.base_url.as_deref(), Some("http://localhost:9"));
    }

    #[tokio::test]
    async fn test_invalid_policy_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "c.toml", "policy = \"newest\"\n").await;
        assert!(Config::load_from_path(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            use_cwd: false,
        };
        assert!(load_settings_with_options(options).await.is_err());
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/srv/crawl");
        assert_eq!(config.resolve_path("out", base), PathBuf::from("/srv/crawl/out"));
        assert_eq!(config.resolve_path("/abs", base), PathBuf::from("/abs"));
    }

    #[test]
    fn test_crawler_config_trims_base_url() {
        let settings = Settings {
            base_url: "https://www.sigstick.com/".to_string(),
            ..Default::default()
        };
        let crawler = settings.crawler_config();
        assert_eq!(crawler.base_url, "https://www.sigstick.com");
        assert_eq!(crawler.pack_delay, Duration::from_millis(2000));
        assert_eq!(crawler.labels.source, "SigStick");
    }
}
