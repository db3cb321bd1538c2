use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Root of the photo site; searches go to `<site_url>/search/<category>/`
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// CSS selector matching the image elements worth collecting
    #[serde(default = "default_image_selector")]
    pub image_selector: String,

    /// Categories to search for, in order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Upper bound on URLs collected per category
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Base directory; each category gets its own subdirectory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of downloads in flight at once
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long to wait for the first matching image after navigating
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Pause after each scroll so lazy content can render
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    /// Pause between two categories
    #[serde(default = "default_category_pause_secs")]
    pub category_pause_secs: u64,

    /// Hard limit on scroll iterations per category, for pages whose height
    /// never settles
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    /// Recognised image extensions
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run Chrome without a window
    #[serde(default)]
    pub headless: bool,

    /// Outbound proxy for the browser and the downloader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

/// Proxy endpoint. Credentials normally come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// `host:port`, as Chrome's `--proxy-server` expects it
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full proxy URL for the HTTP client
    pub fn url(&self) -> String {
        format!("http://{}", self.server())
    }

    /// Fill missing credentials from `PROXY_USERNAME` / `PROXY_PASSWORD`
    pub fn with_env_credentials(mut self) -> Self {
        if self.username.is_none() {
            self.username = std::env::var("PROXY_USERNAME").ok().filter(|v| !v.is_empty());
        }
        if self.password.is_none() {
            self.password = std::env::var("PROXY_PASSWORD").ok().filter(|v| !v.is_empty());
        }
        self
    }
}

fn default_site_url() -> String {
    "https://www.pexels.com".to_string()
}

fn default_image_selector() -> String {
    "img[src^='https://images.pexels.com/photos/']".to_string()
}

fn default_categories() -> Vec<String> {
    ["cat", "dog", "monkey", "cow", "bird"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_images() -> usize {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("datasets/animal_images")
}

fn default_workers() -> usize {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_page_load_timeout_secs() -> u64 {
    20
}

fn default_scroll_pause_ms() -> u64 {
    2000
}

fn default_category_pause_secs() -> u64 {
    3
}

fn default_max_scrolls() -> usize {
    500
}

fn default_extensions() -> Vec<String> {
    vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()]
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            image_selector: default_image_selector(),
            categories: default_categories(),
            max_images: default_max_images(),
            output_dir: default_output_dir(),
            workers: default_workers(),
            request_timeout_secs: default_request_timeout_secs(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            scroll_pause_ms: default_scroll_pause_ms(),
            category_pause_secs: default_category_pause_secs(),
            max_scrolls: default_max_scrolls(),
            extensions: default_extensions(),
            webdriver_url: default_webdriver_url(),
            headless: false,
            proxy: None,
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| ScrapeError::Config(format!("cannot open {}: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    /// Apply environment overrides: `WEBDRIVER_URL` and proxy credentials
    pub fn apply_env(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self.proxy = self.proxy.map(ProxyConfig::with_env_credentials);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn category_pause(&self) -> Duration {
        Duration::from_secs(self.category_pause_secs)
    }
}
