//! cl-scout - Craigslist product watcher with language-model relevance checks
//!
//! Searches Craigslist for configured products, extracts listing details
//! from whichever page layout the site serves, asks a relevance model
//! whether each listing is the product being hunted, and reports matches.

pub mod commands;
pub mod config;
pub mod craigslist;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod notifier;
pub mod pipeline;
pub mod summary;
pub mod throttle;

pub use config::{ProductsFile, Settings};
pub use craigslist::models::{Listing, ListingDetails, ProductResult, SearchQuery};
pub use evaluator::{Confidence, Evaluation, EvaluationStage, RelevanceModel};
pub use summary::{summarize, RunSummary};
