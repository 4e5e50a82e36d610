//! End-to-end mirror runs against a local mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use site_mirror::crawl::{AdmissionLimiter, Mirror};
use site_mirror::fetch::{HtmlDetection, HttpFetcher};
use site_mirror::MirrorConfig;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HTML: &str = "text/html; charset=utf-8";

/// Mounts `template` at `route`, expecting exactly `hits` requests.
async fn mount(server: &MockServer, route: &str, template: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .expect(hits)
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), HTML)
}

#[tokio::test]
async fn test_mirror_small_site() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount(
        &server,
        "/",
        html(
            r#"<html><head><link rel="stylesheet" href="/css/site.css"></head>
               <body>
                 <a href="/about">About</a>
                 <a href="https://elsewhere.invalid/page">External</a>
                 <img data-src="/img/logo.png" src="/img/placeholder.png">
                 <a href="/missing">Gone</a>
               </body></html>"#,
        ),
        1,
    )
    .await;
    mount(
        &server,
        "/about",
        html(r#"<a href="/">Home</a><a href="/about">Self</a><a href="/css/site.css">css</a>"#),
        1,
    )
    .await;
    mount(
        &server,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_raw("body { color: red }", "text/css"),
        1,
    )
    .await;
    mount(
        &server,
        "/img/logo.png",
        ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']),
        1,
    )
    .await;
    mount(&server, "/img/placeholder.png", ResponseTemplate::new(200), 0).await;
    mount(&server, "/missing", ResponseTemplate::new(404), 1).await;

    let fetcher = HttpFetcher::new(Some(Duration::from_secs(5))).expect("client builds");
    let seed = Url::parse(&format!("{}/", server.uri())).unwrap();

    let summary = Mirror::builder(Arc::new(fetcher), temp_dir.path())
        .limiter(AdmissionLimiter::new(3))
        .html_detection(HtmlDetection::MediaType)
        .build()
        .run(seed)
        .await;

    let root = temp_dir.path();
    assert!(root.join("index.html").exists());
    assert!(std::fs::read_to_string(root.join("about"))
        .unwrap()
        .contains("Home"));
    assert_eq!(
        std::fs::read_to_string(root.join("css").join("site.css")).unwrap(),
        "body { color: red }"
    );
    assert_eq!(
        std::fs::read(root.join("img").join("logo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    assert!(!root.join("img").join("placeholder.png").exists());
    assert!(!root.join("missing").exists());

    assert_eq!(summary.stored, 4);
    assert_eq!(summary.html_pages, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.excluded, 1);
    // mock expectations (one hit per URL) are verified when `server` drops
}

#[tokio::test]
async fn test_mirror_respects_depth_from_config() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount(&server, "/", html(r#"<a href="/level1">1</a>"#), 1).await;
    mount(&server, "/level1", html(r#"<a href="/level2">2</a>"#), 1).await;
    mount(&server, "/level2", html(r#"<a href="/level3">3</a>"#), 0).await;

    let config = MirrorConfig::new(&format!("{}/", server.uri()), temp_dir.path())
        .unwrap()
        .with_max_depth(1)
        .with_concurrency(2)
        .unwrap()
        .with_html_detection(HtmlDetection::MediaType);

    let summary = Mirror::new(&config)
        .expect("mirror builds")
        .run(config.seed.clone())
        .await;

    assert_eq!(summary.stored, 2);
    assert!(temp_dir.path().join("level1").exists());
    assert!(!temp_dir.path().join("level2").exists());
}

#[tokio::test]
async fn test_unreachable_seed_completes_without_output() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let config = MirrorConfig::new(&format!("http://127.0.0.1:{}/", port), temp_dir.path())
        .unwrap()
        .with_timeout_secs(2);

    let summary = Mirror::new(&config).unwrap().run(config.seed.clone()).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.stored, 0);
    assert!(!temp_dir.path().join("index.html").exists());
}
