use crate::error::DownloadFailure;
use crate::utils;
use std::fmt;
use std::path::PathBuf;

/// An image URL with its query string removed. Only produced by
/// [`ImageFilter::accept`](crate::filter::ImageFilter::accept), so the path
/// always ends in a recognised extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub(crate) fn new(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension including the dot, exactly as it appears in the URL
    pub fn extension(&self) -> &str {
        utils::extension_of(&self.0)
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of fetching one image
#[derive(Debug)]
pub enum DownloadResult {
    Saved {
        url: ImageUrl,
        path: PathBuf,
        bytes: u64,
    },
    Failed {
        url: ImageUrl,
        reason: DownloadFailure,
    },
}

impl DownloadResult {
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadResult::Saved { .. })
    }
}

/// Everything `fetch_all` attempted for one category, in input order
#[derive(Debug)]
pub struct FetchReport {
    pub category: String,
    pub directory: PathBuf,
    pub results: Vec<DownloadResult>,
}

impl FetchReport {
    pub fn saved_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_saved()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.saved_count()
    }

    /// Paths of the files written in this batch
    pub fn saved_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.results.iter().filter_map(|r| match r {
            DownloadResult::Saved { path, .. } => Some(path),
            DownloadResult::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ImageUrl, &DownloadFailure)> {
        self.results.iter().filter_map(|r| match r {
            DownloadResult::Failed { url, reason } => Some((url, reason)),
            DownloadResult::Saved { .. } => None,
        })
    }
}

/// Summary of one category of a harvest run
#[derive(Debug)]
pub struct CategoryReport {
    pub category: String,

    /// Number of unique URLs discovery produced
    pub discovered: usize,

    /// Present when downloads were dispatched
    pub fetch: Option<FetchReport>,

    /// Why the category was skipped, if it was
    pub error: Option<String>,
}

impl CategoryReport {
    pub(crate) fn skipped(category: &str, error: impl fmt::Display) -> Self {
        Self {
            category: category.to_string(),
            discovered: 0,
            fetch: None,
            error: Some(error.to_string()),
        }
    }

    pub fn saved_count(&self) -> usize {
        self.fetch.as_ref().map_or(0, FetchReport::saved_count)
    }
}
