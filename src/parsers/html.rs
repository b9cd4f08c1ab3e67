use crate::parsers::ParseResult;
use crate::results::{DynamicElement, DynamicTag};
use scraper::{Html, Selector};
use url::Url;

/// Reads images, embedded dynamic elements and anchors from a rendered page in one pass.
///
/// Sources are resolved the way the DOM `src`/`href` properties resolve them:
/// against `<base href>` when present, otherwise against `page_url`.
pub fn parse(html: &str, page_url: &Url) -> ParseResult {
    let doc = Html::parse_document(html);
    let base = document_base(&doc, page_url);

    let image_selector = Selector::parse("img").unwrap();
    let images = doc
        .select(&image_selector)
        .filter_map(|e| resolve(e.value().attr("src"), &base))
        .collect::<Vec<String>>();

    let dynamic_selector = Selector::parse("video, iframe, script[src]").unwrap();
    let dynamic_content = doc
        .select(&dynamic_selector)
        .filter_map(|e| {
            let tag = DynamicTag::from_element_name(&e.value().name().to_ascii_lowercase())?;
            let src = resolve(e.value().attr("src"), &base)?;
            Some(DynamicElement { tag, src })
        })
        .collect::<Vec<DynamicElement>>();

    let link_selector = Selector::parse("a[href]").unwrap();
    let links = doc
        .select(&link_selector)
        .filter_map(|e| resolve(e.value().attr("href"), &base))
        .collect::<Vec<String>>();

    ::log::debug!(
        "HTML parser found {} images, {} dynamic elements, {} links",
        images.len(),
        dynamic_content.len(),
        links.len()
    );

    ParseResult {
        images,
        dynamic_content,
        links,
    }
}

/// Picks the first `<base href>` if it resolves, otherwise the page URL
fn document_base(doc: &Html, page_url: &Url) -> Url {
    let base_selector = Selector::parse("base[href]").unwrap();
    doc.select(&base_selector)
        .next()
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

/// Missing or blank sources are dropped; unresolvable ones are kept verbatim
fn resolve(value: Option<&str>, base: &Url) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    Some(
        base.join(value)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| value.to_string()),
    )
}
