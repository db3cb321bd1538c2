//! Infinite-scroll image discovery.
//!
//! A discovery session navigates to a category's search page, waits for the
//! first qualifying image, then alternates between collecting image URLs and
//! scrolling until it has enough of them or the page stops growing.
//!
//! The stall check compares heights across a single scroll and pause. A page
//! that is slow to render its next batch can look stalled and end the session
//! early; raising `scroll_pause_ms` is the only mitigation.

use crate::browser::Browser;
use crate::config::HarvestConfig;
use crate::error::{Result, ScrapeError};
use crate::filter::ImageFilter;
use crate::results::ImageUrl;
use crate::utils;
use std::collections::HashSet;
use std::time::Duration;

/// Settings for a discovery session
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub site_url: String,
    pub image_selector: String,
    pub page_load_timeout: Duration,
    pub scroll_pause: Duration,
    pub max_scrolls: usize,
}

impl DiscoverySettings {
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            site_url: config.site_url.clone(),
            image_selector: config.image_selector.clone(),
            page_load_timeout: config.page_load_timeout(),
            scroll_pause: config.scroll_pause(),
            max_scrolls: config.max_scrolls,
        }
    }
}

/// Collects unique image URLs for a category from a live page
#[derive(Debug)]
pub struct Discoverer {
    settings: DiscoverySettings,
    filter: ImageFilter,
}

impl Discoverer {
    pub fn new(settings: DiscoverySettings, filter: ImageFilter) -> Self {
        Self { settings, filter }
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        let filter = ImageFilter::new(&config.extensions)
            .map_err(|e| ScrapeError::Config(format!("invalid image extensions: {}", e)))?;
        Ok(Self::new(DiscoverySettings::from_config(config), filter))
    }

    /// Return at most `max_count` unique image URLs for `category`.
    ///
    /// Order follows the set's iteration order, not the page's. A
    /// [`ScrapeError::PageLoadTimeout`] means no image appeared at all.
    pub async fn discover<B: Browser>(
        &self,
        browser: &mut B,
        category: &str,
        max_count: usize,
    ) -> Result<Vec<ImageUrl>> {
        if max_count == 0 {
            ::log::debug!("Nothing to discover for {}: max_count is 0", category);
            return Ok(Vec::new());
        }

        let url = utils::search_url(&self.settings.site_url, category)?;
        let selector = self.settings.image_selector.as_str();

        browser.navigate(url.as_str()).await?;
        browser
            .wait_for_selector(selector, self.settings.page_load_timeout)
            .await?;

        let mut found: HashSet<ImageUrl> = HashSet::new();
        let mut last_height = browser.page_height().await?;
        let mut scrolls = 0;

        loop {
            if self.collect(browser, selector, max_count, &mut found).await? {
                ::log::debug!("Collected {} images for {}", found.len(), category);
                return Ok(found.into_iter().collect());
            }

            if scrolls >= self.settings.max_scrolls {
                ::log::warn!(
                    "Stopping {} after {} scrolls with {} of {} images",
                    category,
                    scrolls,
                    found.len(),
                    max_count
                );
                break;
            }

            browser.scroll_to_bottom().await?;
            scrolls += 1;
            tokio::time::sleep(self.settings.scroll_pause).await;

            let new_height = browser.page_height().await?;
            ::log::debug!(
                "{}: scroll {} height {} -> {}, {}/{} images",
                category,
                scrolls,
                last_height,
                new_height,
                found.len(),
                max_count
            );
            if new_height == last_height {
                ::log::debug!("Page height stalled for {}", category);
                break;
            }
            last_height = new_height;
        }

        Ok(found.into_iter().collect())
    }

    /// Scan the rendered elements into `found`. Returns true once the cap is reached.
    async fn collect<B: Browser>(
        &self,
        browser: &mut B,
        selector: &str,
        max_count: usize,
        found: &mut HashSet<ImageUrl>,
    ) -> Result<bool> {
        let elements = browser.find_matching_elements(selector).await?;
        ::log::trace!("{} elements match {}", elements.len(), selector);

        for element in &elements {
            // Elements can go stale while the page re-renders
            let src = match browser.attribute(element, "src").await {
                Ok(Some(src)) => src,
                Ok(None) => continue,
                Err(e) => {
                    ::log::debug!("Skipping element: {}", e);
                    continue;
                }
            };

            if let Some(image) = self.filter.accept(&src) {
                found.insert(image);
                if found.len() >= max_count {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}
