use crate::crawlers::session::BrowserSession;
use crate::error::{CrawlError, ExtractionError};
use crate::parsers::html;
use crate::results::PageResult;
use crate::utils::snapshot_path;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Output of a successful extraction: the stored result plus the raw anchors
/// the crawler uses for link discovery
#[derive(Debug, Clone)]
pub struct Extraction {
    pub page: PageResult,
    pub links: Vec<String>,
}

/// What happened to one page
#[derive(Debug)]
pub enum PageOutcome {
    Extracted(Extraction),
    /// The page is skipped; the crawl goes on
    Failed(ExtractionError),
}

/// Drives one page load through a [`BrowserSession`] and reads its content
#[derive(Debug, Clone)]
pub struct PageExtractor {
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl PageExtractor {
    pub fn new(navigation_timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            navigation_timeout,
            settle_delay,
        }
    }

    /// Extracts `url`, saving its snapshot as the `sequence`-th file in `snapshot_dir`.
    ///
    /// Browser failures come back as [`PageOutcome::Failed`]. Only a failed
    /// snapshot write is returned as an error, since it leaves the working
    /// directory out of step with the results.
    pub async fn extract<S: BrowserSession>(
        &self,
        session: &mut S,
        url: &str,
        snapshot_dir: &Path,
        sequence: usize,
    ) -> Result<PageOutcome, CrawlError> {
        let started = Instant::now();

        let screenshot = match self.load_and_capture(session, url).await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(PageOutcome::Failed(e)),
        };

        let rendered = match session.rendered_page().await {
            Ok(rendered) => rendered,
            Err(e) => return Ok(PageOutcome::Failed(e)),
        };

        // Only pages that produce a result leave a snapshot behind
        let path = snapshot_path(snapshot_dir, sequence);
        tokio::fs::write(&path, &screenshot)
            .await
            .map_err(|e| CrawlError::io(&path, e))?;

        let parsed = html::parse(&rendered.html, &rendered.url);

        ::log::debug!(
            "Extracted {} in {:.2} seconds",
            url,
            started.elapsed().as_secs_f64()
        );

        Ok(PageOutcome::Extracted(Extraction {
            page: PageResult {
                url: url.to_string(),
                snapshot_path: path,
                images: parsed.images,
                dynamic_content: parsed.dynamic_content,
            },
            links: parsed.links,
        }))
    }

    async fn load_and_capture<S: BrowserSession>(
        &self,
        session: &mut S,
        url: &str,
    ) -> Result<Vec<u8>, ExtractionError> {
        match timeout(self.navigation_timeout, session.navigate(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ExtractionError::Timeout {
                    url: url.to_string(),
                    after: self.navigation_timeout,
                });
            }
        }

        // Give deferred rendering a chance before reading anything
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        session.screenshot().await
    }
}
