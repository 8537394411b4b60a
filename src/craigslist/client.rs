//! HTTP client for Craigslist requests using wreq for browser emulation.

use crate::error::NetworkError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use wreq::Client;
use wreq_util::Emulation;

/// Default site searched when none is configured.
pub const DEFAULT_SITE: &str = "https://sfbay.craigslist.org";

/// Path of the all-for-sale search.
const SEARCH_PATH: &str = "/search/sss";

/// Browser identity sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A fetched page: the requested URL and its raw HTML.
///
/// Relative links on the page are resolved against `url`.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self { url: url.into(), html: html.into() }
    }

    /// Parses the HTML into a document.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Trait for page fetching - enables mocking for tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches one page with a GET request.
    async fn fetch(&self, url: &str) -> Result<Page, NetworkError>;

    /// Builds the search URL for a search term.
    fn search_url(&self, search_term: &str) -> String;
}

/// Craigslist HTTP client. One instance is shared by every request of a run
/// so connections and cookies are reused.
pub struct CraigslistClient {
    client: Client,
    site: String,
}

impl CraigslistClient {
    /// Creates a client for the default site.
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        Self::with_site(DEFAULT_SITE, proxy)
    }

    /// Creates a client for a specific site (regional subdomain, or a mock server in tests).
    pub fn with_site(site: &str, proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, site: site.trim_end_matches('/').to_string() })
    }

    pub fn site(&self) -> &str {
        &self.site
    }
}

/// Builds a search URL against `site` for the given term.
pub fn build_search_url(site: &str, search_term: &str) -> String {
    format!(
        "{}{}?query={}",
        site.trim_end_matches('/'),
        SEARCH_PATH,
        urlencoding::encode(search_term)
    )
}

#[async_trait]
impl PageSource for CraigslistClient {
    async fn fetch(&self, url: &str) -> Result<Page, NetworkError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| NetworkError::Transport { url: url.to_string(), message: e.to_string() })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            if status.as_u16() == 403 || status.as_u16() == 429 {
                warn!("Blocked or rate limited ({}). Consider increasing --delay.", status);
            }
            return Err(NetworkError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let html = response
            .text()
            .await
            .map_err(|e| NetworkError::Body { url: url.to_string(), message: e.to_string() })?;

        Ok(Page::new(url, html))
    }

    fn search_url(&self, search_term: &str) -> String {
        build_search_url(&self.site, search_term)
    }
}

/// Parses a URL for resolving relative links found on it.
pub fn base_url(url: &str) -> Result<Url, NetworkError> {
    Url::parse(url)
        .map_err(|e| NetworkError::InvalidUrl { url: url.to_string(), message: e.to_string() })
}
