//! HTML link extraction
//!
//! The crawler only needs an ordered list of candidate URLs per page; the
//! policy for recognizing them lives behind the `LinkExtractor` trait so it
//! can change without touching the traversal.

use crate::ExtractionError;
use scraper::{Html, Selector};
use url::Url;

/// Turns page content into an ordered sequence of candidate URLs
pub trait LinkExtractor: Send + Sync {
    /// Extracts links from the content fetched for `page_url`
    ///
    /// Links are returned in document order. Callers treat an error as
    /// "no links found".
    fn extract_links(&self, page_url: &str, body: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Extracts `<a href="...">` targets with `scraper`
///
/// By default only hrefs that are already absolute are kept, exactly as
/// written. With `resolve_relative` enabled, relative hrefs are joined onto
/// the page URL.
#[derive(Debug, Clone, Default)]
pub struct HtmlLinkExtractor {
    resolve_relative: bool,
}

impl HtmlLinkExtractor {
    pub fn new(resolve_relative: bool) -> Self {
        Self { resolve_relative }
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, page_url: &str, body: &[u8]) -> Result<Vec<String>, ExtractionError> {
        if looks_binary(body) {
            return Err(ExtractionError::NotText {
                url: page_url.to_string(),
            });
        }
        let html = String::from_utf8_lossy(body);

        let base_url = if self.resolve_relative {
            Url::parse(page_url).ok()
        } else {
            None
        };

        Ok(extract_links(&html, base_url.as_ref()))
    }
}

/// Bytes inspected when sniffing for binary content
const SNIFF_LEN: usize = 1024;

/// Returns true if the start of `body` contains a NUL byte
///
/// Text in any single-byte or UTF-8 encoding never does; images, archives
/// and other binary payloads almost always do.
fn looks_binary(body: &[u8]) -> bool {
    body.iter().take(SNIFF_LEN).any(|b| *b == 0)
}

/// Extracts all candidate links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` targets, in document order
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - Empty and fragment-only hrefs
/// - Relative hrefs, unless a base URL is given
fn extract_links(html: &str, base_url: Option<&Url>) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(link) = resolve_link(href, base_url) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Resolves a link href into a candidate URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - relative hrefs when there is no base
/// - hrefs the base cannot join
fn resolve_link(href: &str, base_url: Option<&Url>) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url {
        Some(base) => base.join(href).ok().map(|url| url.to_string()),
        None => Some(href.to_string()),
    }
}
