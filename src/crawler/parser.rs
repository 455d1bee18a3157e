//! Link extraction from HTML pages

use scraper::{Html, Selector};
use url::Url;

/// Extracts candidate links from a fetched page
///
/// Relative hrefs are resolved against the page URL. Script-ish and
/// non-navigational hrefs (javascript:, mailto:, tel:, data:, bare
/// fragments) are dropped here; same-host and pattern filtering happen
/// in the crawl loop.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
        {
            continue;
        }

        match base_url.join(href) {
            Ok(resolved) => {
                if resolved.scheme() == "http" || resolved.scheme() == "https" {
                    links.push(resolved.to_string());
                }
            }
            Err(e) => {
                tracing::trace!("Skipping unresolvable href '{}': {}", href, e);
            }
        }
    }

    links
}
