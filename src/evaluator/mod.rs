//! Relevance evaluation of listings against a target product.
//!
//! The [`RelevanceModel`] seam only turns a prompt into text. Everything
//! about tolerating what comes back (code fences, bad JSON, API failures)
//! lives in [`EvaluationStage`], which always produces an [`Evaluation`].

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;
pub use prompt::PromptProfile;

use crate::craigslist::models::{Listing, ListingContent, ListingDetails, SearchQuery};
use crate::error::EvaluationError;
use crate::throttle::Throttle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Spacing between consecutive model calls.
pub const EVALUATION_INTERVAL: Duration = Duration::from_secs(2);

/// How sure the model is about its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Low", alias = "LOW")]
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Verdict for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub is_match: bool,
    pub confidence: Confidence,
    #[serde(default)]
    pub reason: String,
}

impl Evaluation {
    /// Verdict for a listing with nothing to classify.
    pub fn no_content() -> Self {
        Self {
            is_match: false,
            confidence: Confidence::High,
            reason: "No title or description available".to_string(),
        }
    }

    /// Degraded verdict when the model could not be consulted.
    pub fn failed(cause: &EvaluationError) -> Self {
        Self {
            is_match: false,
            confidence: Confidence::Low,
            reason: format!("Evaluation error: {}", cause),
        }
    }
}

/// A language model that answers classification prompts with text.
#[async_trait]
pub trait RelevanceModel: Send + Sync {
    /// Sends a prompt and returns the raw text answer.
    async fn generate(&self, prompt: &str) -> Result<String, EvaluationError>;
}

/// Removes a fenced code block wrapper, including an optional language tag.
pub fn strip_code_fence(response: &str) -> &str {
    let text = response.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };

    let body = match body.split_once('\n') {
        Some((tag, inner)) if is_language_tag(tag) => inner,
        _ => body.strip_prefix("json").unwrap_or(body),
    };

    body.trim()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim().chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}

/// Parses a model answer into an evaluation.
pub fn parse_response(response: &str) -> Result<Evaluation, EvaluationError> {
    let text = strip_code_fence(response);
    if text.is_empty() {
        return Err(EvaluationError::EmptyResponse);
    }
    Ok(serde_json::from_str(text)?)
}

/// Classifies listings with a relevance model.
pub struct EvaluationStage<'a, M: RelevanceModel + ?Sized> {
    model: &'a M,
    profile: PromptProfile,
    interval: Duration,
}

impl<'a, M: RelevanceModel + ?Sized> EvaluationStage<'a, M> {
    /// Creates a stage with the production spacing between model calls.
    pub fn new(model: &'a M, profile: PromptProfile) -> Self {
        Self { model, profile, interval: EVALUATION_INTERVAL }
    }

    /// Overrides the spacing between model calls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn profile(&self) -> PromptProfile {
        self.profile
    }

    /// Evaluates one listing. Never fails: model errors degrade to a low-confidence miss.
    pub async fn evaluate(
        &self,
        product_name: &str,
        criteria: &str,
        listing: &ListingDetails,
    ) -> Evaluation {
        if listing.is_blank() {
            return Evaluation::no_content();
        }

        let prompt = self.profile.render(product_name, criteria, listing);

        let result = match self.model.generate(&prompt).await {
            Ok(text) => {
                debug!("Model response: {}", text);
                parse_response(&text)
            }
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| Evaluation::failed(&e))
    }

    /// Evaluates every fetched listing of a product in place.
    ///
    /// Listings whose fetch failed are skipped. Consecutive model calls are
    /// spaced by the stage interval.
    pub async fn evaluate_listings(&self, query: &SearchQuery, listings: &mut [Listing]) {
        let mut throttle = Throttle::new(self.interval);

        for listing in listings.iter_mut() {
            let ListingContent::Fetched(details) = &listing.content else {
                continue;
            };

            if !details.is_blank() {
                throttle.wait().await;
            }

            let evaluation = self.evaluate(&query.product_name, &query.criteria, details).await;

            if evaluation.is_match {
                info!("      MATCH ({} confidence): {}", evaluation.confidence, evaluation.reason);
            } else {
                info!("      No match ({} confidence): {}", evaluation.confidence, evaluation.reason);
            }

            listing.evaluation = Some(evaluation);
        }
    }
}
