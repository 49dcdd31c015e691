//! Site configuration, read from _config.yml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Site-wide settings, all optional in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Identity
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Addressing
    pub url: String,
    pub root: String,

    // Layout on disk
    pub source_dir: String,
    pub public_dir: String,
    /// URL prefix for post pages, e.g. "blog" -> /blog/{id}/
    pub post_dir: String,
    /// URL prefix for category listing pages
    pub category_dir: String,

    // Authoring
    pub new_post_name: String,
    /// Label shown for posts without any category. Display-only: it is
    /// substituted at render time and never stored on a post.
    pub default_category: String,

    // Code highlighting
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Unknown keys are kept so themes can read them
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Wintery".to_string(),
            description: "A collection of thoughts on software engineering, design, and technology.".to_string(),
            author: "Wintery".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            post_dir: "blog".to_string(),
            category_dir: "categories".to_string(),

            new_post_name: ":title.md".to_string(),
            default_category: "General".to_string(),

            highlight: HighlightConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Read a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Read the configuration file if one exists, keep defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme name used for fenced code blocks
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
