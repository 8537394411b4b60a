//! Match digests and their delivery.

pub mod resend;

pub use resend::ResendNotifier;

use crate::summary::MatchedListing;
use async_trait::async_trait;

/// Delivers a digest of matched listings.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends the digest. Failures are logged by the implementation and
    /// reported as `false`; they never abort a run.
    async fn notify(&self, matches: &[MatchedListing]) -> bool;
}

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

impl Digest {
    /// Renders the digest for a non-empty list of matches.
    pub fn render(matches: &[MatchedListing]) -> Self {
        let count = matches.len();
        let subject =
            format!("Craigslist search -- {} found", plural(count, "match", "matches"));

        let mut parts = vec![format!(
            "Found {}!\n",
            plural(count, "matching listing", "matching listings")
        )];

        for (i, matched) in matches.iter().enumerate() {
            let listing = &matched.listing;
            let evaluation = listing.evaluation.as_ref();

            parts.push(format!(
                "\n---\nMatch {}: {}\n\nTitle: {}\nPrice: {}\nConfidence: {}\nReason: {}\n\nView listing: {}\n",
                i + 1,
                matched.product_name,
                listing.title().unwrap_or("N/A"),
                listing.price().unwrap_or("N/A"),
                evaluation.map_or_else(|| "N/A".to_string(), |e| e.confidence.to_string()),
                evaluation.map_or("N/A", |e| e.reason.as_str()),
                listing.url,
            ));
        }

        Self { subject, body: parts.join("\n") }
    }
}
