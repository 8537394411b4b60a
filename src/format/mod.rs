//! Output formatting for run reports (table, JSON).

use crate::config::OutputFormat;
use crate::craigslist::models::ProductResult;
use crate::summary::RunSummary;
use serde::Serialize;

const WIDTH: usize = 70;

/// Formats the final report of a run.
pub struct Formatter {
    format: OutputFormat,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [ProductResult],
    total_listings: usize,
    total_matches: usize,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats all product results together with the run summary.
    pub fn format_report(&self, results: &[ProductResult], summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Json => self.json_report(results, summary),
            OutputFormat::Table => self.table_report(results, summary),
        }
    }

    // JSON formatting

    fn json_report(&self, results: &[ProductResult], summary: &RunSummary) -> String {
        let report = JsonReport {
            results,
            total_listings: summary.total_listings,
            total_matches: summary.total_matches,
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_report(&self, results: &[ProductResult], summary: &RunSummary) -> String {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);
        let mut lines = vec![heavy.clone(), "FINAL RESULTS".to_string(), heavy.clone()];

        for result in results {
            let matches: Vec<_> = result.matches().collect();

            lines.push(String::new());
            lines.push(light.clone());
            lines.push(result.product_name.clone());
            lines.push(format!("   Search: '{}'", result.search_term));
            lines.push(format!(
                "   Listings scraped: {} | Matches found: {}",
                result.listings.len(),
                matches.len()
            ));
            lines.push(light.clone());

            if let Some(error) = &result.search_error {
                lines.push(String::new());
                lines.push(format!("   Search failed: {}", error));
                continue;
            }

            if matches.is_empty() {
                lines.push(String::new());
                lines.push(format!("   No matches found for {}", result.product_name));
                continue;
            }

            for (i, listing) in matches.iter().enumerate() {
                let evaluation = listing.evaluation.as_ref();
                lines.push(String::new());
                lines.push(format!("   Match {}:", i + 1));
                lines.push(format!("   URL: {}", listing.url));
                lines.push(format!("   Title: {}", listing.title().unwrap_or("N/A")));
                lines.push(format!("   Price: {}", listing.price().unwrap_or("N/A")));
                lines.push(format!(
                    "   Confidence: {}",
                    evaluation.map_or_else(|| "N/A".to_string(), |e| e.confidence.to_string())
                ));
                lines.push(format!(
                    "   Reason: {}",
                    evaluation.map_or("N/A", |e| e.reason.as_str())
                ));
            }
        }

        lines.push(String::new());
        lines.push(heavy.clone());
        lines.push(format!(
            "SUMMARY: {} total listings scraped, {} total matches found",
            summary.total_listings, summary.total_matches
        ));
        lines.push(heavy);

        lines.join("\n")
    }
}
