use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of embedded, non-image resource found on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicTag {
    Video,
    Iframe,
    Script,
}

impl DynamicTag {
    /// Maps a lower-cased element name to a recognized tag
    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "video" => Some(DynamicTag::Video),
            "iframe" => Some(DynamicTag::Iframe),
            "script" => Some(DynamicTag::Script),
            _ => None,
        }
    }
}

/// An embedded element that carries a `src` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicElement {
    pub tag: DynamicTag,
    pub src: String,
}

/// Content extracted from one successfully crawled page.
///
/// Field names on the wire (`url`, `screenshot`, `images`, `dynamicContent`)
/// are consumed downstream and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Canonical absolute URL of the page
    pub url: String,

    /// Path of the viewport snapshot saved for this page
    #[serde(rename = "screenshot")]
    pub snapshot_path: PathBuf,

    /// Absolute image sources in document order, duplicates kept
    pub images: Vec<String>,

    /// Video, iframe and external script sources in document order
    #[serde(rename = "dynamicContent")]
    pub dynamic_content: Vec<DynamicElement>,
}

/// Aggregate outcome of one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Pages in the order they were successfully extracted
    pub pages: Vec<PageResult>,

    /// Where the aggregate JSON file was written
    pub aggregate_path: PathBuf,

    /// URLs that were dequeued but failed extraction
    pub skipped: usize,
}

impl CrawlResult {
    /// Snapshot paths of every extracted page, in result order
    pub fn snapshot_paths(&self) -> Vec<PathBuf> {
        self.pages.iter().map(|p| p.snapshot_path.clone()).collect()
    }

    /// True when no dequeued URL failed
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}
