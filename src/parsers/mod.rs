pub mod html;

use crate::results::DynamicElement;

/// Everything read from a rendered page's DOM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Absolute image sources, document order, duplicates kept
    pub images: Vec<String>,
    /// Video, iframe and external script sources
    pub dynamic_content: Vec<DynamicElement>,
    /// Anchor targets; handed to the crawler for link discovery, never stored
    pub links: Vec<String>,
}
