//! CSS selectors for Craigslist HTML parsing.
//!
//! Search result pages come in three layouts depending on listing cohort.
//! Update this file when the site changes its markup, and add a fixture
//! under `tests/fixtures/` for the new shape.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for search results pages, one per known layout.
pub mod search {
    use super::*;

    /// Current layout: result titles are `a.posting-title` links.
    pub static POSTING_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a.posting-title").unwrap());

    /// Gallery view: static result items wrapping a single link.
    pub static GALLERY: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("li.cl-static-search-result a").unwrap());

    /// Legacy layout: result rows with a title link.
    pub static RESULT_ROW: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".result-row a.result-title").unwrap());
}

/// Selectors for individual listing pages.
pub mod listing {
    use super::*;

    /// Title text in the current layout.
    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#titletextonly").unwrap());

    /// Whole posting title heading, used by older pages.
    pub static TITLE_FALLBACK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h1.postingtitle").unwrap());

    /// Asking price.
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price").unwrap());

    /// Body text of the posting.
    pub static BODY: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#postingbody").unwrap());

    /// "QR code link to this post" boilerplate embedded in the body.
    pub static PRINT_INFORMATION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".print-information").unwrap());
}
