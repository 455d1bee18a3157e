//! Politeness: robots.txt resolution and sitemap seeding
//!
//! Each host gets one robots.txt fetch per run. On any failure the resolver
//! falls back to a permissive policy so a missing or broken robots.txt never
//! blocks a crawl.

mod policy;
mod sitemap;

pub use policy::SitePolicy;
pub use sitemap::{collect_sitemap_seeds, extract_loc_entries};

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Resolves and caches per-host crawl policies
pub struct PolitenessResolver {
    client: Client,
    user_agent: String,
    /// host -> policy, one entry per host per run
    cache: HashMap<String, Arc<SitePolicy>>,
}

impl PolitenessResolver {
    /// Creates a resolver that fetches with the given client and identifies
    /// itself with the given user agent when checking rules
    pub fn new(client: Client, user_agent: String) -> Self {
        Self {
            client,
            user_agent,
            cache: HashMap::new(),
        }
    }

    /// Returns the policy for the host of `url`, fetching robots.txt on the
    /// first request for that host
    ///
    /// Never fails: timeouts, non-200 responses, and parse problems all
    /// degrade to the permissive policy.
    pub async fn resolve(&mut self, url: &Url) -> Arc<SitePolicy> {
        let host = match crate::url::extract_host(url) {
            Some(h) => h,
            None => return Arc::new(SitePolicy::allow_all()),
        };

        if let Some(policy) = self.cache.get(&host) {
            return Arc::clone(policy);
        }

        let policy = Arc::new(self.fetch_policy(url, &host).await);
        self.cache.insert(host, Arc::clone(&policy));
        policy
    }

    /// Checks whether a URL is allowed under its host's policy
    pub async fn is_allowed(&mut self, url: &Url) -> bool {
        let user_agent = self.user_agent.clone();
        let policy = self.resolve(url).await;
        policy.is_allowed(url.as_str(), &user_agent)
    }

    async fn fetch_policy(&self, url: &Url, host: &str) -> SitePolicy {
        let robots_url = format!("{}://{}/robots.txt", url.scheme(), host);
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => {
                    tracing::debug!("Parsed robots.txt for {} ({} bytes)", host, body.len());
                    SitePolicy::from_content(&body)
                }
                Err(e) => {
                    tracing::warn!("Failed to read robots.txt body for {}: {}", host, e);
                    SitePolicy::allow_all()
                }
            },
            Ok(response) => {
                tracing::debug!(
                    "robots.txt for {} returned HTTP {}, allowing all",
                    host,
                    response.status()
                );
                SitePolicy::allow_all()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch robots.txt for {}: {}", host, e);
                SitePolicy::allow_all()
            }
        }
    }
}
