use clap::Parser;
use site_snapshot::ScrapeConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-snapshot")]
#[command(about = "Crawls one site and saves snapshots, images and embedded media per page")]
#[command(version)]
pub struct Args {
    /// URL to start crawling from; only pages on the same origin are visited
    pub url: String,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Working directory for snapshots and the aggregate file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of successfully extracted pages
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Stop after this many attempted pages, successful or not
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Remove working-directory files older than this many seconds before crawling
    #[arg(long)]
    pub max_age_secs: Option<u64>,

    /// Keep all existing files in the working directory
    #[arg(long)]
    pub no_cleanup: bool,

    /// WebDriver server URL (also read from WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Treat URLs that differ only by #fragment as one page
    #[arg(long)]
    pub strip_fragments: bool,
}

impl Args {
    /// Applies command-line overrides on top of `config`
    pub fn apply(&self, mut config: ScrapeConfig) -> ScrapeConfig {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = Some(max_attempts);
        }
        if let Some(secs) = self.max_age_secs {
            config.cleanup_max_age_ms = secs.saturating_mul(1000);
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if self.strip_fragments {
            config.filter.strip_fragments = true;
        }
        config
    }
}
