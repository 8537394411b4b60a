//! Scan command: search every configured product, evaluate, report, notify.

use crate::config::{credential, Settings};
use crate::craigslist::models::{ProductResult, SearchQuery};
use crate::craigslist::{CraigslistClient, PageSource};
use crate::evaluator::{EvaluationStage, GeminiClient, RelevanceModel, EVALUATION_INTERVAL};
use crate::format::Formatter;
use crate::notifier::{Notifier, ResendNotifier};
use crate::pipeline::SearchPipeline;
use crate::summary::{summarize, RunSummary};
use crate::throttle::Throttle;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub results: Vec<ProductResult>,
    pub summary: RunSummary,
    /// Delivery result, when notification was enabled
    pub notified: Option<bool>,
}

/// Executes a scan over configured products.
pub struct ScanCommand {
    settings: Settings,
    evaluate: bool,
    evaluation_interval: Duration,
}

impl ScanCommand {
    /// Creates a scan command. With `evaluate` off the run is scrape-only.
    pub fn new(settings: Settings, evaluate: bool) -> Self {
        Self { settings, evaluate, evaluation_interval: EVALUATION_INTERVAL }
    }

    /// Overrides the spacing between model calls.
    pub fn with_evaluation_interval(mut self, interval: Duration) -> Self {
        self.evaluation_interval = interval;
        self
    }

    /// Runs the scan against the live site and returns the formatted report.
    ///
    /// Credentials are checked before any request is made.
    pub async fn execute(&self, queries: &[SearchQuery]) -> Result<String> {
        self.settings.validate()?;

        let model = if self.evaluate {
            let api_key = credential("GEMINI_API_KEY")?;
            info!("Initializing Gemini API ({})", self.settings.model);
            Some(
                GeminiClient::new(api_key, self.settings.model.as_str())
                    .context("Failed to create Gemini client")?,
            )
        } else {
            None
        };

        let notifier = if self.settings.notify {
            Some(ResendNotifier::from_env().context("Failed to create email notifier")?)
        } else {
            None
        };

        let client = CraigslistClient::with_site(&self.settings.site, self.settings.proxy.as_deref())
            .context("Failed to create HTTP client")?;

        let outcome = self
            .run(
                &client,
                model.as_ref().map(|m| m as &dyn RelevanceModel),
                notifier.as_ref().map(|n| n as &dyn Notifier),
                queries,
            )
            .await;

        Ok(self.render(&outcome))
    }

    /// Formats an outcome with the configured output format.
    pub fn render(&self, outcome: &ScanOutcome) -> String {
        Formatter::new(self.settings.format).format_report(&outcome.results, &outcome.summary)
    }

    /// Runs the scan with provided collaborators (for testing).
    ///
    /// A failed search page only loses that product; every other product
    /// still runs.
    pub async fn run(
        &self,
        source: &dyn PageSource,
        model: Option<&dyn RelevanceModel>,
        notifier: Option<&dyn Notifier>,
        queries: &[SearchQuery],
    ) -> ScanOutcome {
        let throttle = Throttle::from_secs_f64(self.settings.delay_secs)
            .with_jitter(Duration::from_millis(self.settings.delay_jitter_ms));
        let pipeline = SearchPipeline::new(source, throttle);
        let stage = model.map(|m| {
            EvaluationStage::new(m, self.settings.profile).with_interval(self.evaluation_interval)
        });

        let mut results = Vec::with_capacity(queries.len());

        for query in queries {
            info!("{}", "=".repeat(60));
            info!("Searching for: {}", query.product_name);
            info!("Search term: '{}'", query.search_term);

            let result = match pipeline.run(query).await {
                Ok(mut listings) => {
                    if let Some(stage) = &stage {
                        stage.evaluate_listings(query, &mut listings).await;
                    }
                    ProductResult::new(query, listings)
                }
                Err(e) => {
                    error!("Search failed for {}: {}", query.product_name, e);
                    ProductResult::search_failed(query, e.to_string())
                }
            };

            results.push(result);
        }

        let summary = summarize(&results);
        info!(
            "{} total listings scraped, {} total matches found",
            summary.total_listings, summary.total_matches
        );

        let notified = match notifier {
            Some(notifier) => Some(notifier.notify(&summary.matches).await),
            None => None,
        };

        ScanOutcome { results, summary, notified }
    }
}
