//! Built-in wintery theme templates using Tera template engine
//!
//! The whole theme is embedded in the binary; `copy_assets` writes its
//! css and js next to the generated HTML.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::url_for;

/// Template renderer with the embedded wintery theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all wintery templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies and filter links arrive as rendered HTML, so
        // autoescaping would double-escape them
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("wintery/layout.html")),
            ("index.html", include_str!("wintery/index.html")),
            ("post.html", include_str!("wintery/post.html")),
            ("page.html", include_str!("wintery/page.html")),
            ("404.html", include_str!("wintery/404.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("wintery/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("wintery/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("wintery/partials/footer.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render one of the embedded templates
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }

    /// Write the theme's static assets under the public directory
    pub fn copy_assets(&self, public_dir: &Path) -> Result<()> {
        let css_dir = public_dir.join("css");
        fs::create_dir_all(&css_dir)?;
        fs::write(
            css_dir.join("style.css"),
            include_str!("wintery/css/style.css"),
        )?;

        let js_dir = public_dir.join("js");
        fs::create_dir_all(&js_dir)?;
        fs::write(
            js_dir.join("copy-code.js"),
            include_str!("wintery/js/copy-code.js"),
        )?;

        Ok(())
    }
}

/// Config fields exposed to templates
#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

impl ConfigData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
        }
    }
}

/// One post entry in a listing
#[derive(Debug, Clone, Serialize)]
pub struct PostItem {
    pub id: String,
    pub title: String,
    pub date: String,
    pub url: String,
    pub categories: Vec<String>,
}

impl PostItem {
    pub fn from_post(post: &Post, config: &SiteConfig) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            url: url_for(config, &post.path),
            categories: post.display_categories(&config.default_category),
        }
    }
}
