//! Sitemap seed collection
//!
//! Sitemaps declared in robots.txt can pre-seed the frontier with article
//! URLs. Fan-out is capped at half the page budget so organic link-following
//! still contributes to the run.

use crate::robots::SitePolicy;
use reqwest::Client;
use scraper::{Html, Selector};

/// Extracts the text of every `<loc>` element in a sitemap document
///
/// Handles both urlset sitemaps and sitemap index files, since each lists
/// its entries inside `<loc>` tags. The document is parsed leniently; a
/// sitemap that fails to yield any entries simply contributes nothing.
pub fn extract_loc_entries(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);

    let selector = match Selector::parse("loc") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// Fetches the sitemaps a policy declared and returns frontier seeds
///
/// Each sitemap is fetched once with no retries; failures are logged and
/// skipped. At most `max_pages / 2` URLs are returned.
pub async fn collect_sitemap_seeds(
    client: &Client,
    policy: &SitePolicy,
    max_pages: usize,
) -> Vec<String> {
    let cap = max_pages / 2;
    if cap == 0 || policy.sitemap_urls().is_empty() {
        return Vec::new();
    }

    let mut seeds = Vec::new();

    for sitemap_url in policy.sitemap_urls() {
        if seeds.len() >= cap {
            break;
        }

        let body = match client.get(sitemap_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed to read sitemap body {}: {}", sitemap_url, e);
                    continue;
                }
            },
            Ok(response) => {
                tracing::warn!("Sitemap {} returned HTTP {}", sitemap_url, response.status());
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch sitemap {}: {}", sitemap_url, e);
                continue;
            }
        };

        let entries = extract_loc_entries(&body);
        tracing::debug!("Sitemap {} yielded {} entries", sitemap_url, entries.len());

        for entry in entries {
            if seeds.len() >= cap {
                break;
            }
            seeds.push(entry);
        }
    }

    tracing::info!(
        "Collected {} sitemap seeds (cap {})",
        seeds.len(),
        cap
    );
    seeds
}
