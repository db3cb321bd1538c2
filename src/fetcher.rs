use crate::config::HarvestConfig;
use crate::error::{DownloadFailure, Result};
use crate::results::{DownloadResult, FetchReport, ImageUrl};
use crate::utils;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Downloads discovered images into per-category directories
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    output_dir: PathBuf,
    workers: usize,
}

impl Fetcher {
    /// Create a fetcher with `workers` concurrent downloads, each bounded by `request_timeout`
    pub fn new(
        output_dir: impl Into<PathBuf>,
        workers: usize,
        request_timeout: Duration,
        proxy: Option<reqwest::Proxy>,
    ) -> Result<Self> {
        // Only an explicitly configured proxy is used, never the environment's
        let builder = Client::builder().timeout(request_timeout);
        let builder = match proxy {
            Some(proxy) => builder.proxy(proxy),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            output_dir: output_dir.into(),
            workers: workers.max(1),
        })
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        let proxy = match &config.proxy {
            Some(proxy_config) => {
                let mut proxy = reqwest::Proxy::all(proxy_config.url())?;
                if let Some(username) = &proxy_config.username {
                    proxy = proxy.basic_auth(username, proxy_config.password.as_deref().unwrap_or(""));
                }
                Some(proxy)
            }
            None => None,
        };

        Self::new(
            &config.output_dir,
            config.workers,
            config.request_timeout(),
            proxy,
        )
    }

    /// Directory images for `category` are written to
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.output_dir.join(utils::sanitize_component(category))
    }

    /// Download every URL into the category's directory and wait for all of them.
    ///
    /// Files are named `<category>_<n><ext>` by 1-based input position.
    /// Individual failures are logged and recorded in the report; only a
    /// failure to create the directory is returned as an error.
    pub async fn fetch_all(&self, urls: &[ImageUrl], category: &str) -> Result<FetchReport> {
        let directory = self.category_dir(category);
        tokio::fs::create_dir_all(&directory).await?;

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            let file_name = utils::file_name_for(category, i + 1, url);
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            let directory = directory.clone();
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                download_one(&client, url, &directory, &file_name).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, url) in handles.into_iter().zip(urls) {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    ::log::error!("Download task for {} did not finish: {}", url, e);
                    results.push(DownloadResult::Failed {
                        url: url.clone(),
                        reason: DownloadFailure::Transport(e.to_string()),
                    });
                }
            }
        }

        Ok(FetchReport {
            category: category.to_string(),
            directory,
            results,
        })
    }
}

/// GET `url` and write the body to `directory/file_name` on a 200 response
pub async fn download_one(
    client: &Client,
    url: ImageUrl,
    directory: &Path,
    file_name: &str,
) -> DownloadResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => return failed(url, e.into()),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return failed(url, DownloadFailure::Status(status.as_u16()));
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return failed(url, e.into()),
    };

    let path = directory.join(file_name);
    if let Err(e) = tokio::fs::write(&path, &body).await {
        return failed(url, e.into());
    }

    ::log::info!("Downloaded: {}", file_name);
    DownloadResult::Saved {
        url,
        path,
        bytes: body.len() as u64,
    }
}

fn failed(url: ImageUrl, reason: DownloadFailure) -> DownloadResult {
    ::log::warn!("Failed to download: {}. {}", url, reason);
    DownloadResult::Failed { url, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;

    #[test]
    fn test_category_dir() {
        let fetcher = Fetcher::new("out", 4, Duration::from_secs(1), None).unwrap();
        assert_eq!(fetcher.category_dir("cat"), PathBuf::from("out").join("cat"));
        assert_eq!(fetcher.category_dir("a/b"), PathBuf::from("out").join("a_b"));
    }

    #[test]
    fn test_zero_workers_still_makes_progress() {
        let fetcher = Fetcher::new("out", 0, Duration::from_secs(1), None).unwrap();
        assert_eq!(fetcher.workers, 1);
    }

    #[test]
    fn test_from_config_with_proxy() {
        let config = HarvestConfig {
            workers: 3,
            proxy: Some(ProxyConfig {
                host: "proxy.local".to_string(),
                port: 3128,
                username: Some("user".to_string()),
                password: None,
            }),
            ..HarvestConfig::default()
        };

        let fetcher = Fetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.workers, 3);
        assert_eq!(fetcher.output_dir, config.output_dir);
    }

    #[tokio::test]
    async fn test_empty_batch_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(dir.path(), 2, Duration::from_secs(1), None).unwrap();

        let report = fetcher.fetch_all(&[], "cow").await.unwrap();

        assert!(report.results.is_empty());
        assert!(dir.path().join("cow").is_dir());
    }
}
