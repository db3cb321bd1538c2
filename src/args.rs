use clap::Parser;
use fauna_harvest::{Harvest, HarvestConfig, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fauna-harvest")]
#[command(about = "Collects animal photos from a search site and downloads them")]
#[command(version)]
pub struct Args {
    /// Categories to search for (defaults to the configured list)
    pub categories: Vec<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of images per category
    #[arg(short, long)]
    pub max_images: Option<usize>,

    /// Number of concurrent downloads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Base directory for downloaded images
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// WebDriver endpoint (overrides WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,
}

impl Args {
    /// Load the configuration and apply command-line overrides on top
    pub fn into_harvest(self) -> Result<Harvest> {
        let config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        }
        .apply_env();

        let mut harvest = Harvest::new(config);
        if !self.categories.is_empty() {
            harvest = harvest.with_categories(self.categories);
        }
        if let Some(max_images) = self.max_images {
            harvest = harvest.with_max_images(max_images);
        }
        if let Some(workers) = self.workers {
            harvest = harvest.with_workers(workers);
        }
        if let Some(output_dir) = self.output_dir {
            harvest = harvest.with_output_dir(output_dir);
        }
        if let Some(webdriver_url) = self.webdriver_url {
            harvest = harvest.with_webdriver_url(webdriver_url);
        }
        if self.headless {
            harvest = harvest.with_headless(true);
        }
        Ok(harvest)
    }
}
