//! Instruction template for listing classification.

use crate::craigslist::models::ListingDetails;
use serde::{Deserialize, Serialize};

/// Placeholder substituted for absent listing fields.
const MISSING: &str = "N/A";

/// How eagerly the model should call something a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptProfile {
    /// Only listings for models explicitly named in the criteria match.
    #[default]
    Strict,
    /// Possible matches are surfaced for a human to check.
    Lenient,
}

impl PromptProfile {
    fn rules(self) -> &'static str {
        match self {
            PromptProfile::Strict => {
                "- is_match should be true ONLY if the listing is for one of the models specified in the matching criteria
- Be STRICT: if the listing is for a different model, variant, or product line not explicitly listed in the criteria, mark as NOT a match
- Accessories, cases, bags, or parts are NOT matches unless the actual camera/product is included
- When in doubt, mark as NOT a match - only include listings that clearly match the specified models
- The listing must explicitly mention or clearly be for one of the allowed models to be considered a match"
            }
            PromptProfile::Lenient => {
                "- is_match should be true if the listing is likely for the product described in the matching criteria
- Listings that bundle the product with accessories or other items ARE matches
- Accessories, cases, bags, or parts sold on their own are NOT matches
- If the title or description is vague but the product could plausibly be the one searched for, mark as a match with low confidence
- Use confidence to express doubt instead of rejecting possible matches"
            }
        }
    }

    /// Builds the classification prompt for one listing.
    pub fn render(self, product_name: &str, criteria: &str, listing: &ListingDetails) -> String {
        format!(
            r#"
You are evaluating a Craigslist listing to determine if it matches a specific product.

PRODUCT BEING SEARCHED: {product_name}

LISTING TITLE: {title}
LISTING PRICE: {price}
LISTING DESCRIPTION: {description}

MATCHING CRITERIA:
{criteria}

Does this listing match the product being searched?

Respond with ONLY a JSON object in this exact format:
{{"is_match": true/false, "confidence": "high/medium/low", "reason": "brief explanation"}}

Rules:
{rules}
"#,
            product_name = product_name,
            title = listing.title.as_deref().unwrap_or(MISSING),
            price = listing.price.as_deref().unwrap_or(MISSING),
            description = listing.description.as_deref().unwrap_or(MISSING),
            criteria = criteria,
            rules = self.rules(),
        )
    }
}

impl std::str::FromStr for PromptProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(PromptProfile::Strict),
            "lenient" => Ok(PromptProfile::Lenient),
            _ => Err(format!("Unknown profile: {}. Use: strict, lenient", s)),
        }
    }
}

impl std::fmt::Display for PromptProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptProfile::Strict => write!(f, "strict"),
            PromptProfile::Lenient => write!(f, "lenient"),
        }
    }
}
