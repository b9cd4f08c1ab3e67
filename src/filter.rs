use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{Origin, Url};

/// Configuration for URL filtering in crawlers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Drop `#fragment` parts so `page#a` and `page#b` collapse into one URL
    #[serde(default)]
    pub strip_fragments: bool,

    /// Regex patterns for URLs to include (if empty, all in-origin URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Resolves a candidate link against the page it was found on.
///
/// Handles relative (`/about`, `../x`), protocol-relative (`//host/x`) and
/// absolute forms. Returns `None` when the candidate cannot form a URL.
pub fn normalize(candidate: &str, base: &Url) -> Option<Url> {
    base.join(candidate.trim()).ok()
}

/// Strict-origin check: scheme, host and port must all match.
///
/// Opaque origins (`mailto:`, `javascript:`, `data:`) never match anything.
pub fn is_in_scope(url: &Url, origin: &Origin) -> bool {
    origin.is_tuple() && url.origin() == *origin
}

/// Decides which discovered links belong to the crawl and in what form they are queued
#[derive(Debug)]
pub struct UrlFilter {
    origin: Origin,
    config: UrlFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a new URL filter scoped to the origin of `start_url`
    pub fn new(start_url: &Url, config: UrlFilterConfig) -> Result<Self, regex::Error> {
        // Compile regex patterns
        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            origin: start_url.origin(),
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// The scheme+host+port tuple every crawled URL must share
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Resolve `candidate` against `base` and return its canonical form if it should be crawled
    pub fn classify(&self, candidate: &str, base: &Url) -> Option<String> {
        let resolved = normalize(candidate, base)?;
        if !self.should_crawl(&resolved) {
            ::log::trace!("URL filter rejected: {}", resolved);
            return None;
        }
        Some(self.canonicalize(resolved).to_string())
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !is_in_scope(url, &self.origin) {
            return false;
        }

        // Check regex exclusions (these take precedence)
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        // If include patterns are specified, at least one must match
        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }

    /// Apply the configured fragment policy; everything else is left as URL parsing produced it
    pub fn canonicalize(&self, mut url: Url) -> Url {
        if self.config.strip_fragments {
            url.set_fragment(None);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    fn filter_with(config: UrlFilterConfig) -> UrlFilter {
        UrlFilter::new(&root(), config).unwrap()
    }

    #[test]
    fn test_normalize_relative_and_absolute_agree() {
        let base = Url::parse("https://example.com/").unwrap();
        let relative = normalize("/about", &base).unwrap();
        let absolute = normalize("https://example.com/about", &base).unwrap();
        assert_eq!(relative, absolute);
        assert_eq!(relative.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_normalize_protocol_relative_and_dot_segments() {
        let base = Url::parse("https://example.com/docs/guide/").unwrap();
        assert_eq!(
            normalize("//cdn.example.org/x", &base).unwrap().as_str(),
            "https://cdn.example.org/x"
        );
        assert_eq!(
            normalize("../intro", &base).unwrap().as_str(),
            "https://example.com/docs/intro"
        );
        assert_eq!(
            normalize("./a/./b", &base).unwrap().as_str(),
            "https://example.com/docs/guide/a/b"
        );
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        let base = root();
        assert!(normalize("http://[::1", &base).is_none());
        assert!(normalize("https://exa mple.com/", &base).is_none());
    }

    #[test]
    fn test_strict_origin_scope() {
        let origin = root().origin();
        let same = Url::parse("https://example.com/about").unwrap();
        let other_host = Url::parse("https://cdn.example.org/x").unwrap();
        let other_scheme = Url::parse("http://example.com/about").unwrap();
        let other_port = Url::parse("https://example.com:8443/about").unwrap();
        let explicit_default_port = Url::parse("https://example.com:443/about").unwrap();
        let subdomain = Url::parse("https://www.example.com/").unwrap();

        assert!(is_in_scope(&same, &origin));
        assert!(is_in_scope(&explicit_default_port, &origin));
        assert!(!is_in_scope(&other_host, &origin));
        assert!(!is_in_scope(&other_scheme, &origin));
        assert!(!is_in_scope(&other_port, &origin));
        assert!(!is_in_scope(&subdomain, &origin));
    }

    #[test]
    fn test_opaque_urls_are_out_of_scope() {
        let filter = filter_with(UrlFilterConfig::default());
        let base = root();
        assert_eq!(filter.classify("mailto:hello@example.com", &base), None);
        assert_eq!(filter.classify("javascript:void(0)", &base), None);
        assert_eq!(filter.classify("tel:+15550100", &base), None);
    }

    #[test]
    fn test_fragments_kept_by_default() {
        let filter = filter_with(UrlFilterConfig::default());
        let base = root();
        let a = filter.classify("/page#a", &base).unwrap();
        let b = filter.classify("/page#b", &base).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, "https://example.com/page#a");
    }

    #[test]
    fn test_fragments_stripped_when_configured() {
        let filter = filter_with(UrlFilterConfig {
            strip_fragments: true,
            ..UrlFilterConfig::default()
        });
        let base = root();
        assert_eq!(
            filter.classify("/page#a", &base).unwrap(),
            filter.classify("/page#b", &base).unwrap()
        );
    }

    #[test]
    fn test_query_and_trailing_slash_are_not_canonicalized() {
        let filter = filter_with(UrlFilterConfig::default());
        let base = root();
        assert_ne!(
            filter.classify("/docs", &base),
            filter.classify("/docs/", &base)
        );
        assert_eq!(
            filter.classify("/search?q=1", &base).unwrap(),
            "https://example.com/search?q=1"
        );
    }

    #[test]
    fn test_regex_patterns() {
        let filter = filter_with(UrlFilterConfig {
            strip_fragments: false,
            include_patterns: vec![r"/docs/".to_string()],
            exclude_patterns: vec![r"/docs/draft/".to_string()],
        });
        let base = root();

        // Matching include pattern should be allowed
        assert!(filter.classify("/docs/page", &base).is_some());

        // Non-matching include pattern should be excluded
        assert!(filter.classify("/blog/post", &base).is_none());

        // Matching exclude pattern should be excluded even if it matches include
        assert!(filter.classify("/docs/draft/page", &base).is_none());

        // Patterns never widen the origin scope
        assert!(filter.classify("https://other.com/docs/page", &base).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = UrlFilterConfig {
            exclude_patterns: vec!["(".to_string()],
            ..UrlFilterConfig::default()
        };
        assert!(UrlFilter::new(&root(), config).is_err());
    }
}
