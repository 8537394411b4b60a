//! Email delivery through the Resend API.

use super::{Digest, Notifier};
use crate::config::credential;
use crate::error::NotificationError;
use crate::summary::MatchedListing;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use wreq::Client;

const RESEND_URL: &str = "https://api.resend.com/emails";
const FROM_ADDRESS: &str = "Craigslist Scraper <onboarding@resend.dev>";

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Sends digests by email.
pub struct ResendNotifier {
    http: Client,
    api_key: String,
    to_email: String,
    url: String,
}

impl ResendNotifier {
    /// Creates a notifier for an explicit key and recipient.
    pub fn new(api_key: impl Into<String>, to_email: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            to_email: to_email.into(),
            url: RESEND_URL.to_string(),
        })
    }

    /// Reads `RESEND_API_KEY` and `NOTIFY_EMAIL` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = credential("RESEND_API_KEY")?;
        let to_email = credential("NOTIFY_EMAIL")?;

        Self::new(api_key, to_email)
    }

    /// Points the notifier at another endpoint (for testing).
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Sends one plain-text email.
    pub async fn send(&self, subject: &str, body: &str) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(&EmailRequest {
            from: FROM_ADDRESS,
            to: [self.to_email.as_str()],
            subject,
            text: body,
        })
        .map_err(|e| NotificationError::Request(e.to_string()))?;

        let response = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Api { status: status.as_u16(), body });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, matches: &[MatchedListing]) -> bool {
        if matches.is_empty() {
            return true;
        }

        let digest = Digest::render(matches);
        match self.send(&digest.subject, &digest.body).await {
            Ok(()) => {
                info!("Sent notification to {}", self.to_email);
                true
            }
            Err(e) => {
                warn!("Email notification failed: {}", e);
                false
            }
        }
    }
}
