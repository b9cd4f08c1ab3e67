use crate::artifacts;
use crate::config::ScrapeConfig;
use crate::crawlers::extractor::{PageExtractor, PageOutcome};
use crate::crawlers::session::BrowserSession;
use crate::error::CrawlError;
use crate::filter::UrlFilter;
use crate::results::{CrawlResult, PageResult};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use url::Url;

/// Frontier and visited set for one run.
///
/// A URL is in at most one of `frontier` and `visited`, and is never queued twice.
#[derive(Debug, Default)]
pub struct CrawlState {
    frontier: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl CrawlState {
    pub fn new(start_url: String) -> Self {
        let mut state = Self::default();
        state.enqueue(start_url);
        state
    }

    /// Appends `url` unless it was already visited or is waiting in the frontier
    pub fn enqueue(&mut self, url: String) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.frontier.push_back(url);
        true
    }

    /// Pops the next URL in discovery order
    pub fn next_url(&mut self) -> Option<String> {
        let url = self.frontier.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Checks if a URL has been visited and marks it as visited if not
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }
}

/// Breadth-first, single-session crawl of one origin
#[derive(Debug)]
pub struct WebCrawler {
    start_url: String,
    filter: UrlFilter,
    extractor: PageExtractor,
    output_dir: PathBuf,
    max_pages: usize,
    max_attempts: Option<usize>,
}

impl WebCrawler {
    pub fn new(start_url: &str, config: &ScrapeConfig) -> Result<Self, CrawlError> {
        config.validate()?;

        let parsed = Url::parse(start_url).map_err(|e| CrawlError::InvalidStartUrl {
            url: start_url.to_string(),
            reason: e.to_string(),
        })?;
        if !parsed.origin().is_tuple() {
            return Err(CrawlError::InvalidStartUrl {
                url: start_url.to_string(),
                reason: "URL has no scheme/host/port origin".to_string(),
            });
        }

        let filter = UrlFilter::new(&parsed, config.filter.clone())
            .map_err(|e| CrawlError::Config(format!("invalid URL pattern: {}", e)))?;
        let start_url = filter.canonicalize(parsed).to_string();

        Ok(Self {
            start_url,
            filter,
            extractor: PageExtractor::new(config.navigation_timeout(), config.settle_delay()),
            output_dir: config.output_dir.clone(),
            max_pages: config.max_pages,
            max_attempts: config.max_attempts,
        })
    }

    /// Canonical form of the start URL, the first frontier entry
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    /// Crawls with `session`, closes it, then writes the aggregate file.
    ///
    /// The session is closed whether the crawl finished, ran out of budget or
    /// hit a fatal error.
    pub async fn run<S: BrowserSession>(&self, mut session: S) -> Result<CrawlResult, CrawlError> {
        let crawled = self.crawl(&mut session).await;

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }

        let (pages, skipped) = crawled?;
        let aggregate_path = artifacts::persist(&self.output_dir, &pages).await?;

        Ok(CrawlResult {
            pages,
            aggregate_path,
            skipped,
        })
    }

    async fn crawl<S: BrowserSession>(
        &self,
        session: &mut S,
    ) -> Result<(Vec<PageResult>, usize), CrawlError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| CrawlError::io(&self.output_dir, e))?;

        ::log::info!(
            "Starting crawl of {} (origin {}, budget {} pages)",
            self.start_url,
            self.filter.origin().ascii_serialization(),
            self.max_pages
        );
        let started = std::time::Instant::now();

        let mut state = CrawlState::new(self.start_url.clone());
        let mut pages: Vec<PageResult> = Vec::new();
        let mut attempts = 0usize;
        let mut skipped = 0usize;

        while pages.len() < self.max_pages {
            if self.max_attempts.is_some_and(|cap| attempts >= cap) {
                ::log::warn!("Stopping after {} attempted pages", attempts);
                break;
            }
            let Some(url) = state.next_url() else {
                break;
            };
            if !state.mark_visited(&url) {
                ::log::trace!("Skipping already visited: {}", url);
                continue;
            }
            attempts += 1;

            let sequence = pages.len() + 1;
            match self
                .extractor
                .extract(session, &url, &self.output_dir, sequence)
                .await?
            {
                PageOutcome::Extracted(extraction) => {
                    self.queue_links(&mut state, &url, &extraction.links);
                    pages.push(extraction.page);
                    ::log::info!("Scraped: {}", url);
                }
                PageOutcome::Failed(e) => {
                    skipped += 1;
                    ::log::warn!("Failed to scrape {}: {}", url, e);
                }
            }
        }

        ::log::info!(
            "Crawl complete - {} pages, {} skipped, {} left in frontier, {:.2} seconds",
            pages.len(),
            skipped,
            state.frontier_len(),
            started.elapsed().as_secs_f64()
        );

        Ok((pages, skipped))
    }

    /// Classifies discovered links and appends the new in-scope ones to the frontier
    fn queue_links(&self, state: &mut CrawlState, page_url: &str, links: &[String]) {
        let Ok(base) = Url::parse(page_url) else {
            return;
        };
        for link in links {
            let Some(normalized) = self.filter.classify(link, &base) else {
                continue;
            };
            if state.enqueue(normalized.clone()) {
                ::log::debug!("Queuing link for crawling: {}", normalized);
            }
        }
    }
}
