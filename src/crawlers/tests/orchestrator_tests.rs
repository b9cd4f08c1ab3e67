use crate::artifacts;
use crate::config::ScrapeConfig;
use crate::crawlers::tests::fake::{FakePage, FakeSite};
use crate::crawlers::web::WebCrawler;
use crate::error::CrawlError;
use crate::filter::UrlFilterConfig;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

fn config(dir: &Path, max_pages: usize) -> ScrapeConfig {
    ScrapeConfig {
        output_dir: dir.to_path_buf(),
        max_pages,
        navigation_timeout_ms: 200,
        settle_delay_ms: 0,
        ..ScrapeConfig::default()
    }
}

fn urls(result: &crate::results::CrawlResult) -> Vec<&str> {
    result.pages.iter().map(|p| p.url.as_str()).collect()
}

#[tokio::test]
async fn test_relative_and_absolute_links_visit_once() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page(
            "https://example.com/",
            FakePage::links(&["/about", "https://example.com/about"]),
        )
        .page("https://example.com/about", FakePage::html("<p>about</p>"));

    let crawler = WebCrawler::new("https://example.com", &config(dir.path(), 5)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(
        urls(&result),
        vec!["https://example.com/", "https://example.com/about"]
    );
    assert_eq!(
        site.navigations(),
        vec!["https://example.com/", "https://example.com/about"]
    );
}

#[tokio::test]
async fn test_out_of_scope_links_are_never_visited() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page(
            "https://example.com/",
            FakePage::links(&[
                "https://cdn.example.org/x",
                "http://example.com/insecure",
                "https://example.com:8080/other-port",
                "/inside",
            ]),
        )
        .page("https://example.com/inside", FakePage::html("<p>in</p>"))
        .page("https://cdn.example.org/x", FakePage::html("<p>cdn</p>"));

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 10)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    let origin = Url::parse("https://example.com/").unwrap().origin();
    for page in &result.pages {
        assert_eq!(Url::parse(&page.url).unwrap().origin(), origin);
    }
    assert_eq!(
        urls(&result),
        vec!["https://example.com/", "https://example.com/inside"]
    );
    assert!(
        !site
            .navigations()
            .contains(&"https://cdn.example.org/x".to_string())
    );
}

#[tokio::test]
async fn test_timeout_does_not_consume_budget() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page(
            "https://example.com/",
            FakePage::links(&["/about", "/contact", "/pricing"]),
        )
        .page("https://example.com/about", FakePage::Hang)
        .page("https://example.com/contact", FakePage::html("<p>c</p>"))
        .page("https://example.com/pricing", FakePage::html("<p>p</p>"));

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 3)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(
        urls(&result),
        vec![
            "https://example.com/",
            "https://example.com/contact",
            "https://example.com/pricing",
        ]
    );
    assert_eq!(result.skipped, 1);
    assert!(!result.is_complete());
}

#[tokio::test]
async fn test_cycle_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page("https://example.com/a", FakePage::links(&["/b"]))
        .page("https://example.com/b", FakePage::links(&["/a", "/b"]));

    let crawler = WebCrawler::new("https://example.com/a", &config(dir.path(), 50)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(
        urls(&result),
        vec!["https://example.com/a", "https://example.com/b"]
    );
    let navigations = site.navigations();
    let unique = navigations.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), navigations.len());
}

#[tokio::test]
async fn test_budget_of_one_discards_frontier() {
    let dir = tempfile::tempdir().unwrap();
    let links = (1..=10).map(|i| format!("/p{}", i)).collect::<Vec<_>>();
    let hrefs = links.iter().map(String::as_str).collect::<Vec<_>>();
    let mut site = FakeSite::new().page("https://example.com/", FakePage::links(&hrefs));
    for link in &links {
        site = site.page(
            &format!("https://example.com{}", link),
            FakePage::html("<p>x</p>"),
        );
    }

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 1)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(result.pages.len(), 1);
    assert_eq!(site.navigations().len(), 1);
}

#[tokio::test]
async fn test_breadth_first_order_and_snapshot_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page("https://example.com/", FakePage::links(&["/a", "/b"]))
        .page("https://example.com/a", FakePage::links(&["/a/deep"]))
        .page("https://example.com/b", FakePage::Error("net::ERR_FAILED".to_string()))
        .page("https://example.com/a/deep", FakePage::html("<p>deep</p>"));

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 10)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(
        urls(&result),
        vec![
            "https://example.com/",
            "https://example.com/a",
            "https://example.com/a/deep",
        ]
    );
    // Failed pages do not advance the sequence
    let names = result
        .snapshot_paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["screenshot_1.png", "screenshot_2.png", "screenshot_3.png"]
    );
    for path in result.snapshot_paths() {
        assert!(path.exists());
    }
}

#[tokio::test]
async fn test_aggregate_matches_in_memory_results() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page(
            "https://example.com/",
            FakePage::html(r#"<img src="/logo.png"><script src="/app.js"></script><a href="/x">x</a>"#),
        )
        .page("https://example.com/x", FakePage::html(r#"<video src="/v.mp4"></video>"#));

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 5)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(result.aggregate_path, dir.path().join("all_scraped_data.json"));
    let reloaded = artifacts::load_aggregate(&result.aggregate_path)
        .await
        .unwrap();
    assert_eq!(reloaded, result.pages);
}

#[tokio::test]
async fn test_session_closed_after_crawl() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new().page("https://example.com/", FakePage::html("<p>only</p>"));

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 5)).unwrap();
    crawler.run(site.session()).await.unwrap();

    assert!(site.closed());
}

#[tokio::test]
async fn test_session_closed_on_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the working directory should be makes directory creation fail
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"not a directory").unwrap();
    let site = FakeSite::new().page("https://example.com/", FakePage::html("<p>x</p>"));

    let crawler = WebCrawler::new("https://example.com/", &config(&blocked, 5)).unwrap();
    let result = crawler.run(site.session()).await;

    assert!(matches!(result, Err(CrawlError::Io { .. })));
    assert!(site.closed());
    assert!(site.navigations().is_empty());
}

#[tokio::test]
async fn test_fragment_policy() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .page("https://example.com/", FakePage::links(&["/page#a", "/page#b"]))
        .page("https://example.com/page#a", FakePage::html("<p>a</p>"))
        .page("https://example.com/page#b", FakePage::html("<p>b</p>"))
        .page("https://example.com/page", FakePage::html("<p>page</p>"));

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 10)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();
    assert_eq!(result.pages.len(), 3);

    let stripping = ScrapeConfig {
        filter: UrlFilterConfig {
            strip_fragments: true,
            ..UrlFilterConfig::default()
        },
        ..config(dir.path(), 10)
    };
    let crawler = WebCrawler::new("https://example.com/", &stripping).unwrap();
    let result = crawler.run(site.session()).await.unwrap();
    assert_eq!(
        urls(&result),
        vec!["https://example.com/", "https://example.com/page"]
    );
}

#[tokio::test]
async fn test_attempt_cap_bounds_failing_sites() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new().page(
        "https://example.com/",
        FakePage::links(&["/dead1", "/dead2", "/dead3", "/dead4"]),
    );

    let capped = ScrapeConfig {
        max_attempts: Some(3),
        ..config(dir.path(), 10)
    };
    let crawler = WebCrawler::new("https://example.com/", &capped).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.skipped, 2);
    assert_eq!(site.navigations().len(), 3);
}

#[tokio::test]
async fn test_failed_start_page_yields_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::new();

    let crawler = WebCrawler::new("https://example.com/", &config(dir.path(), 5)).unwrap();
    let result = crawler.run(site.session()).await.unwrap();

    assert!(result.pages.is_empty());
    assert_eq!(result.skipped, 1);
    assert!(result.aggregate_path.exists());
}
