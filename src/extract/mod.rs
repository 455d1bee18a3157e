//! Content extraction: raw HTML to article text plus structured metadata

use crate::document::{DocumentMetadata, ExtractedDocument, FetchedDocument};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

/// Turns a fetched page into an `ExtractedDocument`
///
/// The crawler calls this once per accepted fetch. Implementations must be
/// cheap: extraction runs on every page, before any budget decision.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, fetched: &FetchedDocument) -> crate::Result<ExtractedDocument>;
}

/// Default extractor backed by the HTML parser
///
/// Article text comes from block-level elements (paragraphs, headings, list
/// items) outside page chrome, joined with blank lines so paragraph
/// structure survives. Metadata comes from the usual suspects: `<title>`,
/// OpenGraph tags, `article:published_time`, and the canonical link.
#[derive(Debug, Default)]
pub struct BasicExtractor;

impl BasicExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ContentExtractor for BasicExtractor {
    fn extract(&self, fetched: &FetchedDocument) -> crate::Result<ExtractedDocument> {
        let document = Html::parse_document(&fetched.body);

        let text = extract_block_text(&document);

        let metadata = DocumentMetadata {
            title: extract_title(&document),
            description: extract_description(&document),
            published_at: extract_published_at(&document),
            canonical_url: attr_of(&document, "link[rel=\"canonical\"]", "href"),
            has_images: has_any(&document, "img"),
            has_videos: has_any(&document, "video")
                || has_any(&document, "iframe[src*=\"youtube\"]")
                || has_any(&document, "iframe[src*=\"vimeo\"]"),
            status_code: fetched.status_code,
            content_type: fetched.content_type.clone(),
        };

        Ok(ExtractedDocument::new(
            fetched.source_url.clone(),
            text,
            metadata,
        ))
    }
}

/// Elements whose text never belongs to the article body
fn is_chrome(name: &str) -> bool {
    matches!(
        name,
        "script" | "style" | "noscript" | "nav" | "footer" | "header" | "aside" | "form"
    )
}

fn inside_chrome(element: &ElementRef) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|el| is_chrome(el.name()))
            .unwrap_or(false)
    })
}

/// Collects article text from block-level elements, blank-line separated
///
/// Falls back to a raw text-node walk when a page has no block markup at
/// all, so text-only pages still yield content.
fn extract_block_text(document: &Html) -> String {
    let selector = match Selector::parse("p, h1, h2, h3, h4, li, blockquote") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    let blocks: Vec<String> = document
        .select(&selector)
        .filter(|el| !inside_chrome(el))
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|block| !block.is_empty())
        .collect();

    if !blocks.is_empty() {
        return blocks.join("\n\n");
    }

    // No block markup; walk the raw text nodes instead.
    let mut pieces = Vec::new();
    for node in document.root_element().descendants() {
        if let Some(text) = node.value().as_text() {
            let skip = node.ancestors().any(|n| {
                n.value()
                    .as_element()
                    .map(|el| is_chrome(el.name()))
                    .unwrap_or(false)
            });
            if !skip {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
        }
    }
    pieces.join(" ")
}

fn extract_title(document: &Html) -> Option<String> {
    text_of(document, "title").or_else(|| attr_of(document, "meta[property=\"og:title\"]", "content"))
}

fn extract_description(document: &Html) -> Option<String> {
    attr_of(document, "meta[name=\"description\"]", "content")
        .or_else(|| attr_of(document, "meta[property=\"og:description\"]", "content"))
}

fn extract_published_at(document: &Html) -> Option<DateTime<Utc>> {
    let raw = attr_of(document, "meta[property=\"article:published_time\"]", "content")?;
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn text_of(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let element = document.select(&sel).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn attr_of(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let element = document.select(&sel).next()?;
    let value = element.value().attr(attr)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn has_any(document: &Html, selector: &str) -> bool {
    Selector::parse(selector)
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false)
}
