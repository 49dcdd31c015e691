//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters that cannot appear raw in a URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%')
    .add(b'/')
    .add(b'\\');

/// Site-relative URL for a path, with the configured root prefixed.
/// An empty path gives the home page URL.
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Absolute URL for a path, domain included
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}{}",
        config.url.trim_end_matches('/'),
        url_for(config, path)
    )
}

/// Percent-encode one URL path segment, such as a post id
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_root(root: &str) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://winter.example.dev".to_string();
        config.root = root.to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = config_with_root("/notes/");
        assert_eq!(url_for(&config, "/css/style.css"), "/notes/css/style.css");
        assert_eq!(url_for(&config, "archive/"), "/notes/archive/");
        assert_eq!(url_for(&config, ""), "/notes/");

        // site served at the domain root
        let config = config_with_root("/");
        assert_eq!(url_for(&config, "blog/hi/"), "/blog/hi/");
        assert_eq!(url_for(&config, ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = config_with_root("/notes/");
        assert_eq!(
            full_url_for(&config, "/archive/"),
            "https://winter.example.dev/notes/archive/"
        );
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("hello world"), "hello%20world");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment("50%"), "50%25");
        // common filename characters pass through
        assert_eq!(encode_segment("my-post.v2"), "my-post.v2");
    }
}
