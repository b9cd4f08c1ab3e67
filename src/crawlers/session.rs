use crate::config::ScrapeConfig;
use crate::error::{CrawlError, ExtractionError};
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use url::Url;

/// How often `document.readyState` is polled while a navigation settles
const READY_STATE_POLL: Duration = Duration::from_millis(100);

/// A page as the browser currently renders it
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the browser ended on after redirects
    pub url: Url,
    /// Serialized live DOM
    pub html: String,
}

/// One controlled browser tab, owned by a single crawl run.
///
/// The orchestrator drives exactly one page at a time through this trait and
/// calls [`BrowserSession::close`] on every exit path.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Load `url` and return once the document has finished loading
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractionError>;

    /// PNG capture of the visible viewport
    async fn screenshot(&mut self) -> Result<Vec<u8>, ExtractionError>;

    /// Current DOM and location
    async fn rendered_page(&mut self) -> Result<RenderedPage, ExtractionError>;

    /// Tear the session down
    async fn close(self) -> Result<(), ExtractionError>;
}

/// [`BrowserSession`] backed by a WebDriver server (ChromeDriver, geckodriver, Selenium)
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Opens a new browser session, trying the configured fallback URLs if the primary one is down
    pub async fn launch(config: &ScrapeConfig) -> Result<Self, CrawlError> {
        let capabilities = browser_capabilities(config);
        let client = connect_to_webdriver(
            &config.webdriver_url,
            &config.webdriver_fallback_urls,
            capabilities,
        )
        .await?;

        let timeouts = TimeoutConfiguration::new(None, Some(config.navigation_timeout()), None);
        if let Err(e) = client.update_timeouts(timeouts).await {
            ::log::warn!("Failed to set page load timeout: {}", e);
        }
        if let Err(e) = client
            .set_window_size(config.window_width, config.window_height)
            .await
        {
            ::log::warn!("Failed to set window size: {}", e);
        }

        Ok(Self { client })
    }
}

impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractionError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| ExtractionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        // goto returns on the load event; scripts may still be replacing the document
        loop {
            let state = self
                .client
                .execute("return document.readyState;", Vec::new())
                .await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(READY_STATE_POLL).await;
        }
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, ExtractionError> {
        Ok(self.client.screenshot().await?)
    }

    async fn rendered_page(&mut self) -> Result<RenderedPage, ExtractionError> {
        let url = self.client.current_url().await?;
        let html = self.client.source().await?;
        Ok(RenderedPage { url, html })
    }

    async fn close(self) -> Result<(), ExtractionError> {
        Ok(self.client.close().await?)
    }
}

/// Capabilities for a headless browser presenting a desktop user agent
fn browser_capabilities(config: &ScrapeConfig) -> Capabilities {
    let mut chrome_args = vec![
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        format!("--user-agent={}", config.user_agent),
        format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ),
    ];
    let mut firefox_args = Vec::new();
    if config.headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "general.useragent.override": config.user_agent },
        }),
    );
    caps
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(
    webdriver_url: &str,
    fallback_urls: &[String],
    capabilities: Capabilities,
) -> Result<Client, CrawlError> {
    let mut last_error = match ClientBuilder::native()
        .capabilities(capabilities.clone())
        .connect(webdriver_url)
        .await
    {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    // If we couldn't connect, try with alternative URLs
    for url in fallback_urls {
        if url == webdriver_url {
            continue; // Skip if it's the same as the one we already tried
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        match ClientBuilder::native()
            .capabilities(capabilities.clone())
            .connect(url)
            .await
        {
            Ok(client) => {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(CrawlError::BrowserLaunch(last_error))
}
