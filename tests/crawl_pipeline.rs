//! End-to-end pack crawls against a local mock site.

use std::sync::Arc;
use std::time::Duration;

use stickercrawl::config::Settings;
use stickercrawl::models::{AssetFormat, PackId, SelectionPolicy};
use stickercrawl::scrapers::{HttpClient, LocateError, PageLocator};
use stickercrawl::services::{read_manifest, DownloadConfig, PackCrawler};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings pointing every host at the mock server, with no delays.
fn settings_for(server: &MockServer, output_dir: &std::path::Path) -> Settings {
    let address = server.address();
    Settings {
        base_url: server.uri(),
        asset_host: format!("{}:{}", address.ip(), address.port()),
        output_dir: output_dir.to_path_buf(),
        request_delay_ms: 0,
        pack_delay_ms: 0,
        retry_base_delay_ms: 0,
        ..Default::default()
    }
}

fn crawler(settings: &Settings) -> PackCrawler<HttpClient> {
    let client = Arc::new(HttpClient::new(&settings.http_config()).unwrap());
    PackCrawler::new(client, settings.crawler_config())
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_asset(server: &MockServer, asset_path: &str, bytes: &'static [u8]) {
    Mock::given(method("GET"))
        .and(path(asset_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_webp_preferred_over_png_for_same_slot() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(
        &server,
        "/pack/PACK1",
        format!(
            r#"<img src="{uri}/PACK1/PACK1-3.png"><script>var a = "{uri}/PACK1/PACK1-3.webp";</script>"#
        ),
    )
    .await;
    mount_asset(&server, "/PACK1/PACK1-3.webp", b"RIFFwebp").await;
    Mock::given(method("GET"))
        .and(path("/PACK1/PACK1-3.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&server, dir.path());
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("PACK1").unwrap())
        .await
        .unwrap();

    assert!(!report.used_fallback);
    assert_eq!(report.result.attempted, 1);
    assert_eq!(report.result.per_format.get(&AssetFormat::Webp), Some(&1));
    assert!(report.result.has_animated);
    assert_eq!(
        std::fs::read(dir.path().join("PACK1").join("PACK1-3.webp")).unwrap(),
        b"RIFFwebp"
    );

    let manifest = read_manifest(&dir.path().join("PACK1")).await.unwrap();
    assert_eq!(manifest.id, "PACK1");
    assert_eq!(manifest.name, "PACK1 Pack");
    assert_eq!(manifest.sticker_count, 1);
    assert!(manifest.has_animated);
}

#[tokio::test]
async fn test_thumbnail_is_never_downloaded() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(
        &server,
        "/pack/PACK1",
        format!(r#"<img src="{uri}/PACK1/PACK1-1.thumb.png"><img src="{uri}/PACK1/PACK1-2.png">"#),
    )
    .await;
    mount_asset(&server, "/PACK1/PACK1-2.png", b"png").await;
    Mock::given(method("GET"))
        .and(path("/PACK1/PACK1-1.thumb.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&server, dir.path());
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("PACK1").unwrap())
        .await
        .unwrap();

    assert_eq!(report.result.attempted, 1);
    assert_eq!(report.result.succeeded, 1);
    assert!(dir.path().join("PACK1").join("PACK1-2.png").exists());
}

#[tokio::test]
async fn test_first_successful_template_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pack/Mixed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pack/mixed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("found"))
        .expect(1)
        .mount(&server)
        .await;
    for later in ["/pack/MIXED", "/sticker-pack/Mixed", "/stickers/Mixed", "/Mixed"] {
        Mock::given(method("GET"))
            .and(path(later))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let client = HttpClient::new(&Default::default()).unwrap();
    let locator = PageLocator::with_default_templates(&server.uri());
    let page = locator
        .locate(&client, &PackId::new("Mixed").unwrap())
        .await
        .unwrap();
    assert_eq!(page.url, format!("{}/pack/mixed", server.uri()));
    assert_eq!(page.body, "found");
}

#[tokio::test]
async fn test_every_template_failing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(5)
        .mount(&server)
        .await;

    let client = HttpClient::new(&Default::default()).unwrap();
    let locator = PageLocator::with_default_templates(&server.uri());
    let err = locator
        .locate(&client, &PackId::new("quby").unwrap())
        .await
        .unwrap_err();
    let LocateError::NotFound { pack_id, tried } = err;
    assert_eq!(pack_id, "quby");
    assert_eq!(tried, 5);
}

#[tokio::test]
async fn test_missing_pack_falls_back_to_ten_guessed_pngs() {
    let server = MockServer::start().await;
    for n in 1..=10 {
        Mock::given(method("GET"))
            .and(path(format!("/stickers/quby/sticker-{}.png", n)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"png"[..]))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&server, dir.path());
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("quby").unwrap())
        .await
        .unwrap();

    assert!(report.used_fallback);
    assert_eq!(report.result.attempted, 10);
    assert_eq!(report.result.per_format.get(&AssetFormat::Png), Some(&10));
    assert!(!report.result.has_animated);
    for n in 1..=10 {
        assert!(dir.path().join("quby").join(format!("quby-{}.png", n)).exists());
    }
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(
        &server,
        "/pack/quby",
        format!(r#"{{"stickers":[{{"url": "{uri}/quby/quby-1.gif"}}]}}"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/quby/quby-1.gif"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_asset(&server, "/quby/quby-1.gif", b"GIF89a").await;

    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&server, dir.path());
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("quby").unwrap())
        .await
        .unwrap();

    assert_eq!(report.result.succeeded, 1);
    assert!(report.result.failures.is_empty());
    assert!(dir.path().join("quby").join("quby-1.gif").exists());
}

#[tokio::test]
async fn test_permanent_failure_is_recorded_and_crawl_continues() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(
        &server,
        "/pack/quby",
        format!(r#"<img src="{uri}/quby/quby-1.png"><img src="{uri}/quby/quby-2.webp">"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/quby/quby-1.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    mount_asset(&server, "/quby/quby-2.webp", b"webp").await;

    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&server, dir.path());
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("quby").unwrap())
        .await
        .unwrap();

    assert_eq!(report.result.attempted, 2);
    assert_eq!(report.result.succeeded, 1);
    assert_eq!(report.result.failures.len(), 1);
    assert_eq!(report.result.failures[0].attempts, 3);
    assert!(!dir.path().join("quby").join("quby-1.png").exists());

    let manifest = read_manifest(&dir.path().join("quby")).await.unwrap();
    assert_eq!(manifest.sticker_count, 1);
    assert_eq!(manifest.attempted_count, 2);
    assert_eq!(manifest.formats.get(&AssetFormat::Png), Some(&1));
    assert_eq!(manifest.downloaded_formats.get(&AssetFormat::Png), None);
}

#[tokio::test]
async fn test_failed_webps_still_mark_pack_animated() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(
        &server,
        "/pack/quby",
        format!(r#"<img src="{uri}/quby/quby-1.webp"><img src="{uri}/quby/quby-2.webp">"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/quby/quby-1.webp"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quby/quby-2.webp"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&server, dir.path());
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("quby").unwrap())
        .await
        .unwrap();
    assert_eq!(report.result.succeeded, 0);

    let manifest = read_manifest(&dir.path().join("quby")).await.unwrap();
    assert_eq!(manifest.sticker_count, 0);
    assert_eq!(manifest.formats.get(&AssetFormat::Webp), Some(&2));
    assert!(manifest.has_animated);
}

#[tokio::test]
async fn test_download_all_fetches_every_format() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(
        &server,
        "/pack/quby",
        format!(r#"<img src="{uri}/quby/quby-1.png"><img src="{uri}/quby/quby-1.webp">"#),
    )
    .await;
    mount_asset(&server, "/quby/quby-1.png", b"png").await;
    mount_asset(&server, "/quby/quby-1.webp", b"webp").await;

    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        policy: SelectionPolicy::DownloadAll,
        ..settings_for(&server, dir.path())
    };
    let report = crawler(&settings)
        .crawl_pack(&PackId::new("quby").unwrap())
        .await
        .unwrap();

    assert_eq!(report.result.succeeded, 2);
    assert!(dir.path().join("quby").join("quby-1.png").exists());
    assert!(dir.path().join("quby").join("quby-1.webp").exists());
}

#[tokio::test]
async fn test_multi_pack_crawl_keeps_going() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings_for(&server, dir.path());
    settings.max_attempts = 1;
    let crawler = crawler(&settings);
    assert_eq!(crawler.config().download.max_attempts, 1);
    assert_eq!(crawler.config().pack_delay, Duration::ZERO);

    let reports = crawler.crawl_packs(&["food", "", "nature"]).await;
    assert_eq!(reports.len(), 3);
    assert!(reports[0].1.is_ok());
    assert!(reports[1].1.is_err());
    let nature = reports[2].1.as_ref().unwrap();
    assert_eq!(nature.result.succeeded, 0);
    assert!(nature.manifest_path.is_some());

    let config = DownloadConfig::default();
    assert_eq!(config.retry_delay(3), Duration::from_secs(3));
}
