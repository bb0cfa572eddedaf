//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::collections::HashSet;
use std::time::{Duration, Instant};
use sumi_sitemap::{generate, generate_with_stats, CrawlOptions, Sitemap, SitemapError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Options with a generous deadline so a regression fails instead of hanging
fn create_test_options(workers: usize, rate: u32) -> CrawlOptions {
    CrawlOptions::new(workers, rate).with_timeout(Duration::from_secs(10))
}

/// Builds an HTML page containing one anchor per href
fn html_with_links(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>Test</title></head><body>{}</body></html>",
        anchors
    )
}

async fn mount_page(server: &MockServer, page: &str, hrefs: &[String]) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html_with_links(hrefs), "text/html"),
        )
        .mount(server)
        .await;
}

fn as_set(sitemap: &Sitemap) -> HashSet<String> {
    sitemap.iter().map(str::to_string).collect()
}

/// Asserts that no URL appears twice
fn assert_unique(sitemap: &Sitemap) {
    assert_eq!(as_set(sitemap).len(), sitemap.len(), "duplicates in {:?}", sitemap);
}

#[tokio::test]
async fn test_crawl_with_cycles_and_external_link() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/b".to_string(), "/c".to_string()]).await;
    mount_page(
        &mock_server,
        "/b",
        &[format!("{}/", base_url), "/c".to_string()],
    )
    .await;
    mount_page(&mock_server, "/c", &["http://other.com/x".to_string()]).await;

    let sitemap = generate(&base_url, &create_test_options(2, 100))
        .await
        .expect("crawl should succeed");

    let expected: HashSet<String> = [
        base_url.clone(),
        format!("{}/b", base_url),
        format!("{}/c", base_url),
    ]
    .into_iter()
    .collect();

    assert_eq!(as_set(&sitemap), expected);
    assert_eq!(sitemap.len(), 3);
    assert_eq!(sitemap.urls()[0], base_url, "root is always first");
}

#[tokio::test]
async fn test_wide_site_every_child_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let children: Vec<String> = (0..50).map(|n| format!("/page{}", n)).collect();
    mount_page(&mock_server, "/", &children).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/page\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_with_links(&[]), "text/html"))
        .mount(&mock_server)
        .await;

    let sitemap = generate(&base_url, &create_test_options(4, 1000))
        .await
        .expect("crawl should succeed");

    assert_eq!(sitemap.len(), 51);
    assert_unique(&sitemap);
    for n in 0..50 {
        assert!(sitemap.contains(&format!("{}/page{}", base_url, n)));
    }
}

#[tokio::test]
async fn test_normalized_variants_collapse() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &[
            "/a/".to_string(),
            "/a".to_string(),
            "/a#frag".to_string(),
            format!("{}/a/#section", base_url),
            "#top".to_string(),
        ],
    )
    .await;
    mount_page(&mock_server, "/a", &["./".to_string()]).await;

    let sitemap = generate(&base_url, &create_test_options(3, 1000))
        .await
        .expect("crawl should succeed");

    assert_eq!(sitemap.urls(), &[base_url.clone(), format!("{}/a", base_url)]);
}

#[tokio::test]
async fn test_non_http_schemes_excluded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &[
            "mailto:test@example.com".to_string(),
            "javascript:void(0)".to_string(),
            "tel:+1234567890".to_string(),
            "/ok".to_string(),
        ],
    )
    .await;
    mount_page(&mock_server, "/ok", &[]).await;

    let sitemap = generate(&base_url, &create_test_options(2, 1000))
        .await
        .expect("crawl should succeed");

    assert_eq!(sitemap.len(), 2);
    assert!(sitemap.iter().all(|url| url.starts_with("http")));
    assert!(sitemap.contains(&format!("{}/ok", base_url)));
}

#[tokio::test]
async fn test_non_success_page_is_listed_but_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/missing".to_string()]).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(html_with_links(&["/hidden".to_string()]), "text/html"),
        )
        .mount(&mock_server)
        .await;

    let (sitemap, stats) = generate_with_stats(&base_url, &create_test_options(1, 1000))
        .await
        .expect("a 404 must not abort the crawl");

    assert_eq!(sitemap.urls(), &[base_url.clone(), format!("{}/missing", base_url)]);
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.non_success_pages, 1);
}

#[tokio::test]
async fn test_cyclic_graph_terminates_with_many_workers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let nodes: Vec<String> = (0..10).map(|n| format!("/n{}", n)).collect();
    mount_page(&mock_server, "/", &nodes).await;

    // Every node links to every other node and back to the root
    let mut everything = nodes.clone();
    everything.push("/".to_string());
    for node in &nodes {
        mount_page(&mock_server, node, &everything).await;
    }

    let sitemap = generate(&base_url, &create_test_options(8, 1000))
        .await
        .expect("cyclic crawl should terminate");

    assert_eq!(sitemap.len(), 11);
    assert_unique(&sitemap);
}

#[tokio::test]
async fn test_stats_reflect_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/b".to_string(), "/c".to_string()]).await;
    mount_page(&mock_server, "/b", &["/".to_string(), "/c".to_string()]).await;
    mount_page(&mock_server, "/c", &["http://other.com/x".to_string()]).await;

    let (sitemap, stats) = generate_with_stats(&base_url, &create_test_options(3, 1000))
        .await
        .expect("crawl should succeed");

    assert_eq!(sitemap.len(), 3);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.non_success_pages, 0);
    assert_eq!(stats.links_discovered, 4);
    assert_eq!(stats.duplicate_links, 2);
    assert_eq!(stats.unique_urls, 3);
    assert_eq!(stats.workers, 3);
    assert!(stats.finished_at >= stats.started_at);
}

#[tokio::test]
async fn test_rate_limit_paces_each_worker() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &["/1".to_string(), "/2".to_string(), "/3".to_string()],
    )
    .await;
    for child in ["/1", "/2", "/3"] {
        mount_page(&mock_server, child, &[]).await;
    }

    let started = Instant::now();
    let sitemap = generate(&base_url, &create_test_options(1, 5))
        .await
        .expect("crawl should succeed");
    let elapsed = started.elapsed();

    assert_eq!(sitemap.len(), 4);
    // Four fetches by one worker at 5/s leave three 200ms gaps
    assert!(
        elapsed >= Duration::from_millis(550),
        "crawl finished too fast: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_deadline_cancels_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_with_links(&[]), "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let options = CrawlOptions::new(2, 10).with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let result = generate(&base_url, &options).await;

    assert!(matches!(result, Err(SitemapError::Timeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = generate(
        &format!("http://127.0.0.1:{}", port),
        &create_test_options(2, 10),
    )
    .await;

    assert!(matches!(result, Err(SitemapError::Http { .. })));
}

/// Serves the given pages and hangs up without replying on any other path
async fn start_flaky_server(pages: Vec<(&'static str, Vec<String>)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let pages = pages.clone();

            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buffer = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buffer).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buffer[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let Some((_, hrefs)) = pages.iter().find(|(page, _)| *page == target) else {
                    return;
                };
                let body = html_with_links(hrefs);

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    base_url
}

#[tokio::test]
async fn test_transport_failure_discards_partial_results() {
    let base_url = start_flaky_server(vec![
        ("/", vec!["/a".to_string(), "/broken".to_string()]),
        ("/a", vec![]),
    ])
    .await;

    let result = generate(&base_url, &create_test_options(1, 1000)).await;

    match result {
        Err(SitemapError::Http { url, .. }) => assert!(url.ends_with("/broken")),
        other => panic!("expected a transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_failure_reported_while_links_pending() {
    // The lone worker dies on the first child while the root's other links
    // are still being handed to the scheduler
    let children: Vec<String> = (0..30).map(|n| format!("/b{}", n)).collect();
    let base_url = start_flaky_server(vec![("/", children)]).await;

    for run in 0..10 {
        let result = generate(&base_url, &create_test_options(1, 1000)).await;
        assert!(
            matches!(result, Err(SitemapError::Http { .. })),
            "run {}: expected a transport error, got {:?}",
            run,
            result
        );
    }
}

#[tokio::test]
async fn test_undecodable_body_is_parse_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw(b"definitely not gzip".to_vec(), "text/html"),
        )
        .mount(&mock_server)
        .await;

    let result = generate(&base_url, &create_test_options(1, 1000)).await;

    assert!(
        matches!(result, Err(SitemapError::HtmlParse { .. })),
        "expected a parse error, got {:?}",
        result
    );
}
