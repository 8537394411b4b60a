//! Search pipeline: search page → listing URLs → listing pages.
//!
//! Listing pages are fetched one at a time in discovery order, spaced by the
//! fetch throttle. A failed listing fetch becomes an error-tagged
//! [`Listing`] and the remaining URLs are still processed; only a failed
//! search page fetch aborts the run for that product.

use crate::craigslist::client::{base_url, PageSource};
use crate::craigslist::models::{Listing, SearchQuery};
use crate::craigslist::parser::{extract_listing_details, extract_listing_urls};
use crate::error::NetworkError;
use crate::throttle::Throttle;
use tracing::{info, warn};

/// Runs searches against a page source.
pub struct SearchPipeline<'a, S: PageSource + ?Sized> {
    source: &'a S,
    throttle: Throttle,
}

impl<'a, S: PageSource + ?Sized> SearchPipeline<'a, S> {
    /// Creates a pipeline whose listing fetches are spaced by `throttle`.
    pub fn new(source: &'a S, throttle: Throttle) -> Self {
        Self { source, throttle }
    }

    /// Searches for one query and fetches every listing found.
    pub async fn run(&self, query: &SearchQuery) -> Result<Vec<Listing>, NetworkError> {
        let search_url = self.source.search_url(&query.search_term);
        info!("Search URL: {}", search_url);

        let page = self.source.fetch(&search_url).await?;
        let base = base_url(&page.url)?;
        let listing_urls = extract_listing_urls(&page.document(), &base);
        info!("Found {} listings", listing_urls.len());

        let total = listing_urls.len();
        let mut throttle = self.throttle.clone();
        let mut listings = Vec::with_capacity(total);

        for (i, url) in listing_urls.into_iter().enumerate() {
            throttle.wait().await;
            info!("  [{}/{}] {}", i + 1, total, url);

            let listing = match self.source.fetch(&url).await {
                Ok(page) => {
                    let details = extract_listing_details(&page.document());
                    Listing::fetched(url, details)
                }
                Err(e) => {
                    warn!("      Error: {}", e);
                    Listing::failed(url, e.to_string())
                }
            };

            listings.push(listing);
        }

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::craigslist::client::{build_search_url, Page};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    const SITE: &str = "https://sfbay.craigslist.org";

    /// In-memory page source that records every URL requested.
    struct MockSource {
        pages: HashMap<String, Result<String, u16>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn new() -> Self {
            Self { pages: HashMap::new(), requests: Mutex::new(Vec::new()) }
        }

        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(html.to_string()));
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for MockSource {
        async fn fetch(&self, url: &str) -> Result<Page, NetworkError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(html)) => Ok(Page::new(url, html.clone())),
                Some(Err(status)) => {
                    Err(NetworkError::Status { url: url.to_string(), status: *status })
                }
                None => Err(NetworkError::Status { url: url.to_string(), status: 404 }),
            }
        }

        fn search_url(&self, search_term: &str) -> String {
            build_search_url(SITE, search_term)
        }
    }

    fn listing_page(title: &str, price: &str) -> String {
        format!(
            r#"<html><body>
                <h1 class="postingtitle"><span id="titletextonly">{}</span></h1>
                <span class="price">{}</span>
                <section id="postingbody">Details about {}</section>
            </body></html>"#,
            title, price, title
        )
    }

    fn query() -> SearchQuery {
        SearchQuery::new("Ricoh GR III", "ricoh gr", None)
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_count() {
        let search = r#"
            <a class="posting-title" href="/sfc/pho/d/one/1.html">One</a>
            <a class="posting-title" href="/sfc/pho/d/two/2.html">Two</a>
            <a class="posting-title" href="/sfc/pho/d/three/3.html">Three</a>
        "#;
        let source = MockSource::new()
            .page(&build_search_url(SITE, "ricoh gr"), search)
            .page(&format!("{}/sfc/pho/d/one/1.html", SITE), &listing_page("One", "$1"))
            .status(&format!("{}/sfc/pho/d/two/2.html", SITE), 410)
            .page(&format!("{}/sfc/pho/d/three/3.html", SITE), &listing_page("Three", "$3"));

        let pipeline = SearchPipeline::new(&source, Throttle::new(Duration::ZERO));
        let listings = pipeline.run(&query()).await.unwrap();

        assert_eq!(listings.len(), 3);
        assert_eq!(listings.iter().filter(|l| l.error().is_some()).count(), 1);

        assert_eq!(listings[0].title(), Some("One"));
        assert_eq!(listings[0].price(), Some("$1"));
        assert!(listings[1].error().unwrap().contains("410"));
        assert!(listings[1].title().is_none());
        assert_eq!(listings[2].title(), Some("Three"));
        assert_eq!(listings[2].description(), Some("Details about Three"));
    }

    #[tokio::test]
    async fn test_listings_in_discovery_order() {
        let search = r#"
            <a class="posting-title" href="/b.html">B</a>
            <a class="posting-title" href="/a.html">A</a>
        "#;
        let source = MockSource::new()
            .page(&build_search_url(SITE, "ricoh gr"), search)
            .page(&format!("{}/b.html", SITE), &listing_page("B", "$2"))
            .page(&format!("{}/a.html", SITE), &listing_page("A", "$1"));

        let pipeline = SearchPipeline::new(&source, Throttle::new(Duration::ZERO));
        let listings = pipeline.run(&query()).await.unwrap();

        let urls: Vec<_> = listings.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec![format!("{}/b.html", SITE), format!("{}/a.html", SITE)]);
        assert_eq!(
            source.requests(),
            vec![
                build_search_url(SITE, "ricoh gr"),
                format!("{}/b.html", SITE),
                format!("{}/a.html", SITE),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_search_is_not_an_error() {
        let source = MockSource::new()
            .page(&build_search_url(SITE, "ricoh gr"), "<html><body>no results</body></html>");

        let pipeline = SearchPipeline::new(&source, Throttle::new(Duration::from_secs(60)));
        let listings = pipeline.run(&query()).await.unwrap();

        assert!(listings.is_empty());
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_search_page_failure_is_fatal() {
        let source = MockSource::new().status(&build_search_url(SITE, "ricoh gr"), 503);

        let pipeline = SearchPipeline::new(&source, Throttle::new(Duration::ZERO));
        let err = pipeline.run(&query()).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_listing_fetches_only() {
        let search = r#"
            <a class="posting-title" href="/1.html">1</a>
            <a class="posting-title" href="/2.html">2</a>
            <a class="posting-title" href="/3.html">3</a>
        "#;
        let source = MockSource::new()
            .page(&build_search_url(SITE, "ricoh gr"), search)
            .page(&format!("{}/1.html", SITE), &listing_page("1", "$1"))
            .status(&format!("{}/2.html", SITE), 500)
            .page(&format!("{}/3.html", SITE), &listing_page("3", "$3"));

        let pipeline = SearchPipeline::new(&source, Throttle::new(Duration::from_millis(40)));
        let start = Instant::now();
        let listings = pipeline.run(&query()).await.unwrap();

        // Three fetches, two gaps, nothing after the last one. A failed fetch still counts.
        assert_eq!(listings.len(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(80));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_listing_never_waits() {
        let source = MockSource::new()
            .page(&build_search_url(SITE, "ricoh gr"), r#"<a class="posting-title" href="/1.html">1</a>"#)
            .page(&format!("{}/1.html", SITE), &listing_page("1", "$1"));

        let pipeline = SearchPipeline::new(&source, Throttle::new(Duration::from_secs(60)));
        let start = Instant::now();
        let listings = pipeline.run(&query()).await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
