//! Data models for search queries, listings and per-product results.

use crate::evaluator::Evaluation;
use serde::Serialize;

/// One configured product search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Product name as shown in reports
    pub product_name: String,
    /// Text sent to the site's search box
    pub search_term: String,
    /// Free-text matching rules for the relevance model
    pub criteria: String,
}

impl SearchQuery {
    /// Builds a query, generating criteria from the product name when absent.
    pub fn new(
        product_name: impl Into<String>,
        search_term: impl Into<String>,
        criteria: Option<String>,
    ) -> Self {
        let product_name = product_name.into();
        let criteria = criteria.unwrap_or_else(|| default_criteria(&product_name));
        Self { product_name, search_term: search_term.into(), criteria }
    }
}

/// Criteria used when a product does not configure its own.
pub fn default_criteria(product_name: &str) -> String {
    format!("Must be a {}", product_name)
}

/// Fields extracted from a listing page. Each is absent when the page lacks it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingDetails {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl ListingDetails {
    /// True when neither a title nor a description was found.
    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Outcome of fetching a listing's own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListingContent {
    Fetched(ListingDetails),
    Failed { error: String },
}

/// A classified ad discovered under a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Absolute listing URL
    pub url: String,
    #[serde(flatten)]
    pub content: ListingContent,
    /// Set only by the evaluation stage, and only for fetched listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

impl Listing {
    /// A listing whose page was fetched and parsed.
    pub fn fetched(url: impl Into<String>, details: ListingDetails) -> Self {
        Self { url: url.into(), content: ListingContent::Fetched(details), evaluation: None }
    }

    /// A listing whose page fetch failed.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: ListingContent::Failed { error: error.into() },
            evaluation: None,
        }
    }

    /// Extracted fields, or None when the fetch failed.
    pub fn details(&self) -> Option<&ListingDetails> {
        match &self.content {
            ListingContent::Fetched(details) => Some(details),
            ListingContent::Failed { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.details().and_then(|d| d.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.details().and_then(|d| d.description.as_deref())
    }

    pub fn price(&self) -> Option<&str> {
        self.details().and_then(|d| d.price.as_deref())
    }

    /// Fetch failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.content {
            ListingContent::Failed { error } => Some(error),
            ListingContent::Fetched(_) => None,
        }
    }

    /// True when the relevance model judged this listing a match.
    pub fn is_match(&self) -> bool {
        self.evaluation.as_ref().is_some_and(|e| e.is_match)
    }
}

/// All listings found for one configured product, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductResult {
    pub product_name: String,
    pub search_term: String,
    pub listings: Vec<Listing>,
    /// Set when the search results page itself could not be fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
}

impl ProductResult {
    /// Result for a search that completed.
    pub fn new(query: &SearchQuery, listings: Vec<Listing>) -> Self {
        Self {
            product_name: query.product_name.clone(),
            search_term: query.search_term.clone(),
            listings,
            search_error: None,
        }
    }

    /// Result for a search whose results page could not be fetched.
    pub fn search_failed(query: &SearchQuery, error: impl Into<String>) -> Self {
        Self {
            product_name: query.product_name.clone(),
            search_term: query.search_term.clone(),
            listings: Vec::new(),
            search_error: Some(error.into()),
        }
    }

    /// Listings judged a match, in discovery order.
    pub fn matches(&self) -> impl Iterator<Item = &Listing> {
        self.listings.iter().filter(|l| l.is_match())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Confidence;

    #[test]
    fn test_query_default_criteria() {
        let query = SearchQuery::new("Fujifilm X100V", "x100v", None);
        assert_eq!(query.criteria, "Must be a Fujifilm X100V");

        let query = SearchQuery::new("Ricoh GR", "ricoh gr", Some("GR III only".to_string()));
        assert_eq!(query.criteria, "GR III only");
    }

    #[test]
    fn test_failed_listing_has_no_content() {
        let listing = Listing::failed("https://sfbay.craigslist.org/a/1.html", "404 error");
        assert_eq!(listing.error(), Some("404 error"));
        assert!(listing.title().is_none());
        assert!(listing.description().is_none());
        assert!(listing.price().is_none());
        assert!(listing.details().is_none());
    }

    #[test]
    fn test_listing_serializes_flat() {
        let mut listing = Listing::fetched(
            "https://sfbay.craigslist.org/a/1.html",
            ListingDetails {
                title: Some("Camera".to_string()),
                description: None,
                price: Some("$500".to_string()),
            },
        );
        listing.evaluation = Some(Evaluation {
            is_match: true,
            confidence: Confidence::High,
            reason: "exact".to_string(),
        });

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["title"], "Camera");
        assert_eq!(json["price"], "$500");
        assert!(json["description"].is_null());
        assert_eq!(json["evaluation"]["confidence"], "high");

        let failed = serde_json::to_value(Listing::failed("u", "boom")).unwrap();
        assert_eq!(failed["error"], "boom");
        assert!(failed.get("evaluation").is_none());
    }

    #[test]
    fn test_product_result_matches() {
        let query = SearchQuery::new("Camera", "camera", None);
        let mut hit = Listing::fetched("u1", ListingDetails::default());
        hit.evaluation =
            Some(Evaluation { is_match: true, confidence: Confidence::Medium, reason: String::new() });
        let miss = Listing::fetched("u2", ListingDetails::default());

        let result = ProductResult::new(&query, vec![hit, miss]);
        let urls: Vec<_> = result.matches().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["u1"]);
    }
}
