use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure while extracting a single page.
///
/// These never abort a crawl: the page is recorded as skipped and the
/// orchestrator moves on to the next frontier entry.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Navigation did not settle within the configured timeout
    #[error("navigation to {url} timed out after {}ms", .after.as_millis())]
    Timeout { url: String, after: Duration },

    /// The browser refused or failed the navigation itself
    #[error("failed to navigate to {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// Any other WebDriver command failure (screenshot, source, script)
    #[error("browser command failed: {0}")]
    Browser(String),
}

impl From<fantoccini::error::CmdError> for ExtractionError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        ExtractionError::Browser(e.to_string())
    }
}

/// Failure that makes the whole result set untrustworthy.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid start URL {url}: {reason}")]
    InvalidStartUrl { url: String, reason: String },

    /// No browser session could be opened
    #[error("failed to start browser session: {0}")]
    BrowserLaunch(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CrawlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CrawlError::Io {
            path: path.into(),
            source,
        }
    }
}
