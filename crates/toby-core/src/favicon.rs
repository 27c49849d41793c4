//! Favicon URLs derived from an item's hostname.

use url::Url;

use crate::config::FaviconConfig;

/// Favicon service URL for the host of `page_url`.
///
/// Falls back to the configured placeholder when the URL does not parse or
/// has no host (e.g. `about:blank`).
pub fn favicon_for_url(page_url: &str, config: &FaviconConfig) -> String {
    match Url::parse(page_url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}?domain={}&sz={}", config.service_url, host, config.size),
            None => config.default_icon.clone(),
        },
        Err(e) => {
            tracing::debug!("Cannot derive favicon for {:?}: {}", page_url, e);
            config.default_icon.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "https://doc.rust-lang.org/book/",
        "https://www.google.com/s2/favicons?domain=doc.rust-lang.org&sz=32"
    )]
    #[case(
        "http://localhost:8080/x",
        "https://www.google.com/s2/favicons?domain=localhost&sz=32"
    )]
    #[case("not a url", "icons/default-favicon.png")]
    #[case("about:blank", "icons/default-favicon.png")]
    fn test_favicon_for_url(#[case] page_url: &str, #[case] expected: &str) {
        assert_eq!(favicon_for_url(page_url, &FaviconConfig::default()), expected);
    }
}
