//! Print site content to the terminal

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::content::CatalogLoader;
use crate::Wintery;

/// Print posts, pages or categories
pub fn run(app: &Wintery, content_type: &str) -> Result<()> {
    let loader = CatalogLoader::new(app);

    match content_type {
        "post" | "posts" => list_posts(app, &loader),
        "page" | "pages" => list_pages(&loader),
        "category" | "categories" => list_categories(&loader),
        other => bail!("Unknown type: {}. Available: post, page, category", other),
    }
}

fn list_posts(app: &Wintery, loader: &CatalogLoader) -> Result<()> {
    let posts = loader.list_posts()?;
    println!("Posts ({}):", posts.len());
    for post in posts {
        let labels = post.display_categories(&app.config.default_category);
        println!(
            "  {}  {}  [{}]",
            post.date.format("%Y-%m-%d"),
            post.title,
            labels.join(", ")
        );
    }
    Ok(())
}

fn list_pages(loader: &CatalogLoader) -> Result<()> {
    let pages = loader.load_pages()?;
    println!("Pages ({}):", pages.len());
    for page in pages {
        println!("  {}  [{}]", page.title, page.source);
    }
    Ok(())
}

/// Categories with post counts, most used first
fn list_categories(loader: &CatalogLoader) -> Result<()> {
    let posts = loader.list_posts()?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in &posts {
        for label in &post.categories {
            *counts.entry(label.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!("Categories ({}):", ranked.len());
    for (label, count) in ranked {
        println!("  {} ({})", label, count);
    }
    Ok(())
}
