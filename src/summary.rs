//! Run-wide aggregation of per-product results.

use crate::craigslist::models::{Listing, ProductResult};
use serde::Serialize;

/// A matched listing together with the product it was found for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedListing {
    pub product_name: String,
    pub listing: Listing,
}

/// Totals and matches across all products of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_listings: usize,
    pub total_matches: usize,
    pub matches: Vec<MatchedListing>,
}

/// Folds product results into a summary.
///
/// Matches keep listing order within a product and product order across
/// the input.
pub fn summarize(results: &[ProductResult]) -> RunSummary {
    results.iter().fold(RunSummary::default(), |mut summary, result| {
        summary.total_listings += result.listings.len();
        for listing in result.matches() {
            summary.total_matches += 1;
            summary.matches.push(MatchedListing {
                product_name: result.product_name.clone(),
                listing: listing.clone(),
            });
        }
        summary
    })
}
