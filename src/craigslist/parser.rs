//! HTML extraction for Craigslist search results and listing pages.
//!
//! Search pages are matched against an ordered chain of layouts. The first
//! layout that yields at least one URL wins and the rest are never consulted,
//! so markup from different cohorts is never mixed.

use crate::craigslist::models::ListingDetails;
use crate::craigslist::selectors::{listing, search};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, trace};
use url::Url;

/// Known search result layouts, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLayout {
    /// `a.posting-title` links
    Current,
    /// `li.cl-static-search-result` items
    Gallery,
    /// `.result-row a.result-title` rows
    Legacy,
}

impl SearchLayout {
    /// Priority order of the selector chain.
    pub const CHAIN: [SearchLayout; 3] =
        [SearchLayout::Current, SearchLayout::Gallery, SearchLayout::Legacy];

    fn selector(self) -> &'static Selector {
        match self {
            SearchLayout::Current => &*search::POSTING_TITLE,
            SearchLayout::Gallery => &*search::GALLERY,
            SearchLayout::Legacy => &*search::RESULT_ROW,
        }
    }

    /// Extracts listing URLs using this layout only. None when it finds nothing.
    pub fn extract(self, document: &Html, base_url: &Url) -> Option<Vec<String>> {
        let urls: Vec<String> = document
            .select(self.selector())
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| resolve(base_url, href))
            .collect();

        if urls.is_empty() {
            None
        } else {
            Some(urls)
        }
    }
}

/// Resolves a possibly relative href against the page it was found on.
fn resolve(base_url: &Url, href: &str) -> Option<String> {
    match base_url.join(href.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            trace!("Skipping unresolvable href {:?}: {}", href, e);
            None
        }
    }
}

/// Extracts listing URLs from a search results page.
///
/// Returns an empty vector when no known layout matches; an empty search is
/// a valid outcome, not an error.
pub fn extract_listing_urls(document: &Html, base_url: &Url) -> Vec<String> {
    for layout in SearchLayout::CHAIN {
        if let Some(urls) = layout.extract(document, base_url) {
            debug!("Matched {:?} layout with {} listings", layout, urls.len());
            return urls;
        }
    }

    debug!("No known search layout matched");
    Vec::new()
}

/// Extracts title, description and price from a listing page.
pub fn extract_listing_details(document: &Html) -> ListingDetails {
    let title = first_text(document, &listing::TITLE)
        .or_else(|| first_text(document, &listing::TITLE_FALLBACK));

    let price = first_text(document, &listing::PRICE);

    let description = document
        .select(&listing::BODY)
        .next()
        .and_then(|body| non_empty(body_text(body)));

    ListingDetails { title, description, price }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().and_then(|e| non_empty(e.text().collect()))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Collects the text of a posting body, leaving out print-information blocks.
fn body_text(body: ElementRef) -> String {
    let mut text = String::new();
    collect_text(body, &mut text);
    text
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if listing::PRINT_INFORMATION.matches(&child) {
                        continue;
                    }
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}
