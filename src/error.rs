use std::time::Duration;
use thiserror::Error;

/// Errors that stop a harvest step: a category's discovery, a fetch batch
/// setup, or the session itself.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No qualifying element appeared before the wait expired
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    PageLoadTimeout { selector: String, timeout: Duration },

    /// A WebDriver command failed
    #[error("browser command failed: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    /// No WebDriver session could be established
    #[error("could not start a WebDriver session: {0}")]
    Connect(#[from] fantoccini::error::NewSessionError),

    /// A script returned something other than what the caller expected
    #[error("unexpected script result: {0}")]
    Script(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a single image could not be saved. Never aborts the batch.
#[derive(Debug, Error)]
pub enum DownloadFailure {
    #[error("status code {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("could not write file: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<reqwest::Error> for DownloadFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            DownloadFailure::Timeout
        } else {
            DownloadFailure::Transport(error.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_load_timeout_names_selector() {
        let err = ScrapeError::PageLoadTimeout {
            selector: "img.photo".to_string(),
            timeout: Duration::from_secs(20),
        };
        assert_eq!(err.to_string(), "timed out after 20s waiting for `img.photo`");
    }

    #[test]
    fn test_download_failure_messages() {
        assert_eq!(DownloadFailure::Status(404).to_string(), "status code 404");
        assert_eq!(DownloadFailure::Timeout.to_string(), "request timed out");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(DownloadFailure::from(io), DownloadFailure::Storage(_)));
    }
}
