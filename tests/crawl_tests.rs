//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! full crawl cycle end-to-end: frontier scheduling, robots.txt, sitemap
//! seeding, scope filters, and the acceptance rules.

use newsdrift::config::{CrawlConfig, UserAgentConfig};
use newsdrift::crawler::SiteCrawler;
use newsdrift::DriftError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn test_crawl_config() -> CrawlConfig {
    CrawlConfig {
        max_pages: 20,
        max_depth: 3,
        follow_links: true,
        min_length: 50,
        delay_ms: 0,
        respect_robots: false,
        use_sitemap: false,
        ..CrawlConfig::default()
    }
}

/// An article body comfortably above the 50-char test floor
fn article(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body>\
         <h1>{title}</h1>\
         <p>Reporting on {title} continues with plenty of detail so the \
         extracted text clears the acceptance floor comfortably.</p>\
         {anchors}</body></html>"
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_breadth_first_crawl_bounded_by_max_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/a", "/b"])).await;
    mount_page(&server, "/a", article("a", &["/a1", "/a2"])).await;
    mount_page(&server, "/b", article("b", &["/b1"])).await;
    mount_page(&server, "/a1", article("a1", &[])).await;
    mount_page(&server, "/a2", article("a2", &[])).await;
    mount_page(&server, "/b1", article("b1", &[])).await;

    let mut config = test_crawl_config();
    config.max_pages = 3;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.stats.pages_visited, 3);
    // FIFO frontier: home first, then its links in discovery order.
    let urls: Vec<&str> = outcome
        .documents
        .iter()
        .map(|d| d.source_url.as_str())
        .collect();
    assert_eq!(urls.len(), 3);
    assert!(urls[0].ends_with('/'));
    assert!(urls[1].ends_with("/a"));
    assert!(urls[2].ends_with("/b"));
}

#[tokio::test]
async fn test_robots_disallow_blocks_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/",
        article("home", &["/private/secret", "/public"]),
    )
    .await;
    mount_page(&server, "/public", article("public", &[])).await;

    // The disallowed page must never receive a request.
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html(article("secret", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_crawl_config();
    config.respect_robots = true;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.documents.len(), 2);
    assert_eq!(outcome.stats.pages_filtered, 1);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    mount_page(&server, "/", article("home", &["/page"])).await;
    mount_page(&server, "/page", article("page", &[])).await;

    let mut config = test_crawl_config();
    config.respect_robots = true;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.documents.len(), 2);
}

#[tokio::test]
async fn test_sitemap_seeds_frontier() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml",
            base
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<?xml version=\"1.0\"?><urlset>\
             <url><loc>{base}/news/1</loc></url>\
             <url><loc>{base}/news/2</loc></url>\
             </urlset>"
        )))
        .mount(&server)
        .await;

    mount_page(&server, "/", article("home", &[])).await;
    mount_page(&server, "/news/1", article("one", &[])).await;
    mount_page(&server, "/news/2", article("two", &[])).await;

    let mut config = test_crawl_config();
    config.follow_links = false;
    config.use_sitemap = true;
    config.max_pages = 10;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&base).await.unwrap();

    assert_eq!(outcome.documents.len(), 3);
    assert_eq!(outcome.stats.pages_visited, 3);
}

#[tokio::test]
async fn test_sitemap_seeds_capped_at_half_page_budget() {
    let server = MockServer::start().await;
    let base = server.uri();

    let locs: String = (1..=10)
        .map(|i| format!("<url><loc>{base}/news/{i}</loc></url>"))
        .collect();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nSitemap: {}/sitemap.xml",
            base
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("<urlset>{locs}</urlset>")),
        )
        .mount(&server)
        .await;

    mount_page(&server, "/", article("home", &[])).await;
    for i in 1..=10 {
        mount_page(&server, &format!("/news/{i}"), article(&format!("n{i}"), &[])).await;
    }

    let mut config = test_crawl_config();
    config.follow_links = false;
    config.use_sitemap = true;
    config.max_pages = 6;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&base).await.unwrap();

    // Seed plus at most max_pages/2 = 3 sitemap URLs.
    assert_eq!(outcome.stats.pages_visited, 4);
}

#[tokio::test]
async fn test_min_length_floor_filters_thin_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/thin"])).await;
    mount_page(
        &server,
        "/thin",
        "<html><body><p>too short</p></body></html>".to_string(),
    )
    .await;

    let mut crawler = SiteCrawler::new(test_crawl_config(), &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.stats.pages_filtered, 1);
    assert_eq!(outcome.stats.pages_visited, 2);
}

#[tokio::test]
async fn test_pattern_filters_scope_the_frontier() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        article("home", &["/news/story", "/tag/economy", "/video/clip"]),
    )
    .await;
    mount_page(&server, "/news/story", article("story", &[])).await;

    Mock::given(method("GET"))
        .and(path("/tag/economy"))
        .respond_with(html(article("tag", &[])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video/clip"))
        .respond_with(html(article("video", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_crawl_config();
    config.allowed_patterns = vec!["/news/".to_string()];
    config.blocked_patterns = vec!["/tag/".to_string()];

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    // Filters apply to discovered links, not the seed itself.
    assert_eq!(outcome.documents.len(), 2);
    assert_eq!(outcome.stats.pages_visited, 2);
}

#[tokio::test]
async fn test_offsite_links_not_followed() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        article("home", &["https://elsewhere.example.com/story", "/local"]),
    )
    .await;
    mount_page(&server, "/local", article("local", &[])).await;

    let mut crawler = SiteCrawler::new(test_crawl_config(), &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.stats.pages_visited, 2);
}

#[tokio::test]
async fn test_non_html_response_filtered() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/feed.json"])).await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"items\":[]}", "application/json"),
        )
        .mount(&server)
        .await;

    let mut crawler = SiteCrawler::new(test_crawl_config(), &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.stats.pages_filtered, 1);
}

#[tokio::test]
async fn test_shared_link_scheduled_once() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/a", "/b"])).await;
    mount_page(&server, "/a", article("a", &["/c"])).await;
    mount_page(&server, "/b", article("b", &["/c"])).await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html(article("c", &[])))
        .expect(1)
        .mount(&server)
        .await;

    let mut crawler = SiteCrawler::new(test_crawl_config(), &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.stats.pages_visited, 4);
    assert_eq!(outcome.documents.len(), 4);
}

#[tokio::test]
async fn test_links_beyond_max_depth_not_followed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/a"])).await;
    mount_page(&server, "/a", article("a", &["/deep"])).await;

    // /a sits at depth 1, the cap, so its links must never be scheduled.
    Mock::given(method("GET"))
        .and(path("/deep"))
        .respond_with(html(article("deep", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_crawl_config();
    config.max_depth = 1;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.stats.pages_visited, 2);
    assert_eq!(outcome.documents.len(), 2);
}

#[tokio::test]
async fn test_http_error_counts_as_errored() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/gone"])).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut crawler = SiteCrawler::new(test_crawl_config(), &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.stats.pages_errored, 1);
}

#[tokio::test]
async fn test_invalid_seed_rejected() {
    let mut crawler = SiteCrawler::new(test_crawl_config(), &test_user_agent()).unwrap();
    let result = crawler.crawl("not a url at all").await;
    assert!(matches!(result.unwrap_err(), DriftError::InvalidSeed(_)));
}

#[tokio::test]
async fn test_follow_links_disabled_fetches_seed_only() {
    let server = MockServer::start().await;

    mount_page(&server, "/", article("home", &["/a"])).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(article("a", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_crawl_config();
    config.follow_links = false;

    let mut crawler = SiteCrawler::new(config, &test_user_agent()).unwrap();
    let outcome = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(outcome.stats.pages_visited, 1);
    assert_eq!(outcome.documents.len(), 1);
}
