use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the set of absolute outlinks from a fetched document
///
/// Every `a[href]` target is resolved against the page URL. Only well-formed
/// absolute http(s) URLs on the same host as the page survive; relative
/// fragments that fail to resolve, other schemes, and off-host links are
/// dropped silently. Fragments are cleared so `#section` anchors do not
/// produce duplicate frontier entries.
pub fn extract_links(document: &Html, page_url: &Url) -> HashSet<Url> {
    // The selector literal is valid, parse cannot fail
    let anchor = Selector::parse("a[href]").unwrap();

    let mut links = HashSet::new();
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(mut resolved) = page_url.join(href) else {
            tracing::trace!("Dropping unresolvable href: {}", href);
            continue;
        };
        resolved.set_fragment(None);

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if resolved.host_str() != page_url.host_str() {
            continue;
        }

        links.insert(resolved);
    }

    tracing::debug!("Found {} outlinks from: {}", links.len(), page_url);
    links
}
