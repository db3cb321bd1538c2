pub mod browser;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use browser::{Browser, WebDriverSession};
pub use config::HarvestConfig;
pub use discovery::Discoverer;
pub use error::{DownloadFailure, Result, ScrapeError};
pub use fetcher::Fetcher;
pub use results::{CategoryReport, DownloadResult, FetchReport, ImageUrl};

use std::path::PathBuf;

/// Main builder for a harvest run: discover then download, one category at a time
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    /// Create a new Harvest builder from a configuration
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Replace the category list
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.config.categories = categories;
        self
    }

    /// Set the per-category cap on discovered images
    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.config.max_images = max_images;
        self
    }

    /// Set the number of concurrent downloads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = output_dir.into();
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.config.webdriver_url = webdriver_url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Connect a WebDriver session and harvest every category with it
    pub async fn run(&self) -> Result<Vec<CategoryReport>> {
        let browser = WebDriverSession::connect(&self.config).await?;
        self.run_with_browser(browser).await
    }

    /// Harvest every category with `browser`, closing it once at the end
    /// whatever the outcome.
    pub async fn run_with_browser<B: Browser>(&self, mut browser: B) -> Result<Vec<CategoryReport>> {
        let outcome = self.harvest_all(&mut browser).await;

        if let Err(e) = browser.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }

        outcome
    }

    async fn harvest_all<B: Browser>(&self, browser: &mut B) -> Result<Vec<CategoryReport>> {
        let discoverer = Discoverer::from_config(&self.config)?;
        let fetcher = Fetcher::from_config(&self.config)?;

        let mut reports = Vec::with_capacity(self.config.categories.len());
        for (i, category) in self.config.categories.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.category_pause()).await;
            }
            reports.push(
                self.harvest_category(browser, &discoverer, &fetcher, category)
                    .await,
            );
        }

        Ok(reports)
    }

    async fn harvest_category<B: Browser>(
        &self,
        browser: &mut B,
        discoverer: &Discoverer,
        fetcher: &Fetcher,
        category: &str,
    ) -> CategoryReport {
        ::log::info!("Scraping images for: {}", category);

        let urls = match discoverer
            .discover(browser, category, self.config.max_images)
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                ::log::error!("Skipping {}: {}", category, e);
                return CategoryReport::skipped(category, e);
            }
        };

        if urls.is_empty() {
            ::log::info!("No images found for {}", category);
            return CategoryReport {
                category: category.to_string(),
                discovered: 0,
                fetch: None,
                error: None,
            };
        }

        ::log::info!("Found {} images for {}", urls.len(), category);
        match fetcher.fetch_all(&urls, category).await {
            Ok(report) => {
                ::log::info!(
                    "Finished scraping {} images: {} saved, {} failed",
                    category,
                    report.saved_count(),
                    report.failed_count()
                );
                CategoryReport {
                    category: category.to_string(),
                    discovered: urls.len(),
                    fetch: Some(report),
                    error: None,
                }
            }
            Err(e) => {
                ::log::error!("Could not download {} images: {}", category, e);
                CategoryReport {
                    category: category.to_string(),
                    discovered: urls.len(),
                    fetch: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
