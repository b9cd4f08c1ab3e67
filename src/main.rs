use clap::Parser;
use site_snapshot::{Scrape, ScrapeConfig};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match ScrapeConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load configuration: {}", e);
                std::process::exit(2);
            }
        },
        None => ScrapeConfig::default(),
    };
    let config = args.apply(config.apply_env());

    println!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!("Set WEBDRIVER_URL if not using {}", config.webdriver_url);

    let mut scrape = Scrape::new(&args.url).with_config(config);
    if args.no_cleanup {
        scrape = scrape.without_cleanup();
    }

    match scrape.run().await {
        Ok(result) => {
            println!(
                "Scraped {} pages ({} skipped), results in {}",
                result.pages.len(),
                result.skipped,
                result.aggregate_path.display()
            );
        }
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            std::process::exit(1);
        }
    }
}
