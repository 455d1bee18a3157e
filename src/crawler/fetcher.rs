//! HTTP fetcher
//!
//! Builds the HTTP client used by the whole run and fetches single pages,
//! classifying every failure into a skip reason. A fetch never aborts the
//! run; the crawl loop decides what each result means.

use crate::document::FetchedDocument;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

/// Result of fetching one URL
#[derive(Debug)]
pub enum FetchResult {
    /// Page fetched and is HTML
    Success(FetchedDocument),

    /// Response was not HTML
    NotHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-2xx HTTP status
    HttpStatus {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network-level failure (timeout, connection refused, TLS, ...)
    Network {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client for a crawl run
///
/// Redirects are followed automatically (up to 10 hops); the final URL after
/// redirects becomes the document's source URL. Extra headers from the
/// config are merged over the defaults; a header that fails to parse is
/// logged and dropped rather than failing the run.
pub fn build_http_client(
    user_agent: &str,
    extra_headers: &HashMap<String, String>,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in extra_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!("Skipping invalid header '{}'", name);
            }
        }
    }

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx + text/html | Success |
/// | 2xx + other Content-Type | NotHtml |
/// | non-2xx | HttpStatus |
/// | timeout / connect / body read error | Network |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::Network { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpStatus {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        return FetchResult::NotHtml { content_type };
    }

    let final_url = response.url().to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success(FetchedDocument {
            source_url: final_url,
            body,
            status_code: status.as_u16(),
            content_type,
            fetched_at: Utc::now(),
        }),
        Err(e) => FetchResult::Network {
            error: e.to_string(),
        },
    }
}
