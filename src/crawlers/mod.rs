pub mod extractor;
pub mod session;
pub mod web;

#[cfg(test)]
pub(crate) mod tests;

pub use extractor::{Extraction, PageExtractor, PageOutcome};
pub use session::{BrowserSession, RenderedPage, WebDriverSession};
pub use web::{CrawlState, WebCrawler};
