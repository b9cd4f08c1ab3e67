//! Same-origin site crawler that captures viewport snapshots, images and
//! embedded media from every page it reaches through a WebDriver browser.

pub mod artifacts;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScrapeConfig;
pub use error::{CrawlError, ExtractionError};
pub use results::{CrawlResult, DynamicElement, DynamicTag, PageResult};

use crawlers::{WebCrawler, WebDriverSession};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main builder for a crawl run
#[derive(Debug, Clone)]
pub struct Scrape {
    start_url: String,
    config: ScrapeConfig,
    cleanup: bool,
}

impl Scrape {
    /// Create a new builder for `start_url` with default settings
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            config: ScrapeConfig::default().apply_env(),
            cleanup: true,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ScrapeConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let config = ScrapeConfig::from_file(path)?.apply_env();
        Ok(self.with_config(config))
    }

    /// Set the working directory for snapshots and the aggregate file
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the maximum number of successfully extracted pages
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Cap the number of pages attempted, including failures
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.max_attempts = Some(max_attempts);
        self
    }

    /// Set how old a working-directory file must be before cleanup removes it
    pub fn with_cleanup_max_age(mut self, max_age: Duration) -> Self {
        self.config.cleanup_max_age_ms = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Keep every file already in the working directory
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = false;
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    /// Treat URLs that differ only by `#fragment` as the same page
    pub fn with_strip_fragments(mut self, strip: bool) -> Self {
        self.config.filter.strip_fragments = strip;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Clean up stale artifacts, open a browser session and crawl
    pub async fn run(self) -> Result<CrawlResult, CrawlError> {
        let crawler = WebCrawler::new(&self.start_url, &self.config)?;

        if self.cleanup {
            artifacts::cleanup(&self.config.output_dir, self.config.cleanup_max_age()).await;
        }

        let session = WebDriverSession::launch(&self.config).await?;
        crawler.run(session).await
    }
}

/// Removes files older than `max_age` from `dir`; errors are logged, never returned
pub async fn cleanup_old_files(dir: impl AsRef<Path>, max_age: Duration) -> usize {
    artifacts::cleanup(dir.as_ref(), max_age).await
}

/// Crawls `start_url` with default settings, overriding the working directory and page budget when given
pub async fn scrape_all_pages(
    start_url: &str,
    dir: Option<&Path>,
    max_pages: Option<usize>,
) -> Result<CrawlResult, CrawlError> {
    let mut scrape = Scrape::new(start_url);
    if let Some(dir) = dir {
        scrape = scrape.with_output_dir(dir);
    }
    if let Some(max_pages) = max_pages {
        scrape = scrape.with_max_pages(max_pages);
    }
    scrape.run().await
}
