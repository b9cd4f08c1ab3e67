use crate::error::CrawlError;
use crate::filter::UrlFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a site snapshot crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Working directory for snapshots and the aggregate file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of successfully extracted pages
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Optional cap on pages attempted, successful or not
    #[serde(default)]
    pub max_attempts: Option<usize>,

    /// Files in the working directory older than this are removed before a crawl
    #[serde(default = "default_cleanup_max_age_ms")]
    pub cleanup_max_age_ms: u64,

    /// Upper bound for one navigation to settle
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Fixed wait after navigation before the DOM is read
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// WebDriver URLs tried in order when `webdriver_url` refuses the session
    #[serde(default = "default_webdriver_fallback_urls")]
    pub webdriver_fallback_urls: Vec<String>,

    /// User agent the browser presents to the site
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Viewport width in pixels
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Viewport height in pixels
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Link filtering options
    #[serde(flatten)]
    pub filter: UrlFilterConfig,
}

/// Default value for output_dir
fn default_output_dir() -> PathBuf {
    PathBuf::from("website_clone_data")
}

/// Default value for max_pages
fn default_max_pages() -> usize {
    50
}

/// One hour
fn default_cleanup_max_age_ms() -> u64 {
    60 * 60 * 1000
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_webdriver_fallback_urls() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://localhost:4444".to_string(), // geckodriver / Selenium default
        "http://127.0.0.1:4444".to_string(), // Try with IP instead of localhost
    ]
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    800
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_pages: default_max_pages(),
            max_attempts: None,
            cleanup_max_age_ms: default_cleanup_max_age_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            webdriver_url: default_webdriver_url(),
            webdriver_fallback_urls: default_webdriver_fallback_urls(),
            user_agent: default_user_agent(),
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            filter: UrlFilterConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrawlError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| CrawlError::io(path, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CrawlError::io(path, e))?;

        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CrawlError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CrawlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with an environment variable if provided
    pub fn apply_env(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_attempts == Some(0) {
            return Err(CrawlError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.navigation_timeout_ms == 0 {
            return Err(CrawlError::Config(
                "navigation_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cleanup_max_age(&self) -> Duration {
        Duration::from_millis(self.cleanup_max_age_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
