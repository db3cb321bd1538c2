use crate::browser::Browser;
use crate::config::HarvestConfig;
use crate::error::{Result, ScrapeError};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Endpoints tried when the configured WebDriver URL does not answer
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// A browser driven over the WebDriver protocol
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Start a Chrome session using the endpoint and flags from `config`
    pub async fn connect(config: &HarvestConfig) -> Result<Self> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(chrome_capabilities(config));

        let first_error = match builder.connect(&config.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    config.webdriver_url,
                    e
                );
                e
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == config.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = builder.connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(ScrapeError::Connect(first_error))
    }
}

/// Chrome options: no sandbox, no automation banner, optional headless and proxy
pub fn chrome_capabilities(config: &HarvestConfig) -> Map<String, Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    if let Some(proxy) = &config.proxy {
        args.push(format!("--proxy-server={}", proxy.server()));
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

impl Browser for WebDriverSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        ::log::debug!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(ScrapeError::PageLoadTimeout {
                selector: selector.to_string(),
                timeout,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_matching_elements(&mut self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.client.find_all(Locator::Css(selector)).await?)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn page_height(&mut self) -> Result<u64> {
        let value = self
            .client
            .execute("return document.body.scrollHeight", vec![])
            .await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
            .ok_or_else(|| ScrapeError::Script(format!("scrollHeight was {}", value)))
    }

    async fn attribute(&mut self, element: &Element, name: &str) -> Result<Option<String>> {
        // The DOM property holds the resolved URL; fall back to the raw attribute
        if let Some(value) = element.prop(name).await? {
            return Ok(Some(value));
        }
        Ok(element.attr(name).await?)
    }

    async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;

    fn chrome_args(caps: &Map<String, Value>) -> Vec<String> {
        caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_default_capabilities() {
        let caps = chrome_capabilities(&HarvestConfig::default());
        let args = chrome_args(&caps);

        assert_eq!(caps["browserName"], "chrome");
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(!args.iter().any(|a| a.starts_with("--proxy-server")));
    }

    #[test]
    fn test_headless_and_proxy_capabilities() {
        let config = HarvestConfig {
            headless: true,
            proxy: Some(ProxyConfig {
                host: "pr.example.io".to_string(),
                port: 7777,
                username: None,
                password: None,
            }),
            ..HarvestConfig::default()
        };
        let args = chrome_args(&chrome_capabilities(&config));

        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--proxy-server=pr.example.io:7777".to_string()));
    }
}
