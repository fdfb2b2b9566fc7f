//! HTML link extraction
//!
//! Pulls candidate hrefs out of a fetched page body. Extraction is
//! deliberately permissive: it returns raw href strings, and the link
//! processor decides which of them enter the frontier.

use scraper::{Html, Selector};

/// Extracts raw href values from an HTML document
///
/// Collected from `<a href>`, `<link href>`, and `<area href>` elements.
/// Skips hrefs that can never become crawlable URLs:
/// - `javascript:`, `mailto:`, `tel:`, `data:` schemes
/// - fragment-only anchors (`#...`)
/// - empty hrefs
///
/// # Arguments
///
/// * `html` - The page body as text
///
/// # Returns
///
/// Raw href strings in document order, duplicates included
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut hrefs = Vec::new();

    for selector in ["a[href]", "link[href]", "area[href]"] {
        // These selectors are static and always parse.
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if is_candidate(href) {
                    hrefs.push(href.to_string());
                }
            }
        }
    }

    hrefs
}

fn is_candidate(href: &str) -> bool {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    for scheme in ["javascript:", "mailto:", "tel:", "data:"] {
        let prefix = href.get(..scheme.len());
        if prefix.is_some_and(|p| p.eq_ignore_ascii_case(scheme)) {
            return false;
        }
    }

    true
}
