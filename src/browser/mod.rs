//! The browser capability discovery depends on.
//!
//! Discovery only needs a handful of operations from a live page, so they
//! are expressed as a trait. [`WebDriverSession`] drives a real browser
//! through WebDriver; tests substitute a scripted page.

pub mod webdriver;

pub use webdriver::WebDriverSession;

use crate::error::Result;
use std::time::Duration;

/// A scriptable browser page
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Handle to a rendered element
    type Element;

    /// Load `url` in the current tab
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until an element matches `selector`.
    ///
    /// Fails with [`ScrapeError::PageLoadTimeout`](crate::error::ScrapeError::PageLoadTimeout)
    /// when nothing matches within `timeout`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// All elements currently matching `selector`
    async fn find_matching_elements(&mut self, selector: &str) -> Result<Vec<Self::Element>>;

    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Current scroll height of the document body
    async fn page_height(&mut self) -> Result<u64>;

    async fn attribute(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// End the session. Called once, after the last category.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}
