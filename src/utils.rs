use crate::results::ImageUrl;
use url::Url;

/// Build `<site>/search/<category>/`, percent-encoding the category
pub fn search_url(site_url: &str, category: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(site_url)?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["search", category, ""]);
    Ok(url)
}

/// Extension of the last path segment, dot included; empty if there is none
pub fn extension_of(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// Make a category safe to use as a directory or file name component
pub fn sanitize_component(name: &str) -> String {
    let cleaned = name
        .trim()
        .replace(['/', '\\', ':', '?', '*', '"', '<', '>', '|'], "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<category>_<index><ext>`, with `index` counted from 1
pub fn file_name_for(category: &str, index: usize, url: &ImageUrl) -> String {
    format!("{}_{}{}", sanitize_component(category), index, url.extension())
}
