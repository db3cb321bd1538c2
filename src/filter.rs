use crate::results::ImageUrl;
use regex::Regex;

/// Decides which `src` values are image URLs worth downloading
#[derive(Debug)]
pub struct ImageFilter {
    extension_regex: Regex,
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new([".jpg", ".jpeg", ".png"]).expect("Default extension patterns should be valid")
    }
}

impl ImageFilter {
    /// Create a filter accepting URLs whose path ends in one of `extensions`.
    /// The leading dot is optional. Matching is case-sensitive.
    pub fn new<I, S>(extensions: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives = extensions
            .into_iter()
            .map(|ext| regex::escape(ext.as_ref().trim_start_matches('.')))
            .filter(|ext| !ext.is_empty())
            .collect::<Vec<_>>();

        // An empty list accepts nothing
        let pattern = if alternatives.is_empty() {
            r"[^\s\S]".to_string()
        } else {
            format!(r"\.(?:{})$", alternatives.join("|"))
        };

        Ok(Self {
            extension_regex: Regex::new(&pattern)?,
        })
    }

    /// Strip the query string from a raw URL. Fragments are left in place.
    pub fn normalize(raw: &str) -> &str {
        raw.split('?').next().unwrap_or(raw)
    }

    /// Whether an already normalized URL ends in a recognised extension
    pub fn is_image(&self, url: &str) -> bool {
        self.extension_regex.is_match(url)
    }

    /// Normalize `raw` and return it if it names a recognised image
    pub fn accept(&self, raw: &str) -> Option<ImageUrl> {
        let normalized = Self::normalize(raw);
        if normalized.is_empty() || !self.is_image(normalized) {
            ::log::trace!("Rejected image candidate: {}", raw);
            return None;
        }
        Some(ImageUrl::new(normalized.to_string()))
    }
}
