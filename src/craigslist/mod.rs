//! Craigslist-specific modules for fetching, parsing and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{CraigslistClient, Page, PageSource};
pub use models::{Listing, ListingContent, ListingDetails, ProductResult, SearchQuery};
pub use parser::{extract_listing_details, extract_listing_urls, SearchLayout};
