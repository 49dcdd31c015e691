//! wintery: a markdown blog generator
//!
//! A directory of markdown posts with front-matter becomes a static
//! blog: a home page with category filters, one page per post,
//! standalone pages, and a sitemap. The theme is a set of Tera
//! templates embedded in the binary.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;
pub mod view;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog rooted at one directory. Holds the loaded configuration and
/// the derived source and output locations.
#[derive(Clone)]
pub struct Wintery {
    pub config: config::SiteConfig,
    pub base_dir: PathBuf,
    pub source_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl Wintery {
    /// Open the blog at `base_dir`, reading _config.yml when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::load_or_default(base_dir.join("_config.yml"))?;

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        })
    }

    /// Directory holding the post markdown sources
    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir.join("_posts")
    }

    /// Build the whole site into the public directory
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Remove the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
