//! Writes the static site: listings, posts, pages, 404 and sitemap

use anyhow::Result;
use std::fs;
use std::path::Path;
use tera::Context;
use walkdir::WalkDir;

use crate::content::{CatalogLoader, Page, Post};
use crate::helpers::{attach_copy_buttons, full_url_for};
use crate::templates::{ConfigData, PostItem, TemplateRenderer};
use crate::view::{self, FilterState};
use crate::Wintery;

/// Static site generator
pub struct Generator {
    app: Wintery,
    renderer: TemplateRenderer,
}

impl Generator {
    pub fn new(app: &Wintery) -> Result<Self> {
        Ok(Self {
            app: app.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, loader: &CatalogLoader, posts: &[Post], pages: &[Page]) -> Result<()> {
        fs::create_dir_all(&self.app.public_dir)?;

        // Theme assets and passthrough files first
        self.renderer.copy_assets(&self.app.public_dir)?;
        self.copy_source_assets()?;

        let categories = view::compute_categories(posts);

        // The home page plus one listing per category, each rendered
        // from its own filter state
        self.generate_listing(posts, &categories, &FilterState::all())?;
        for label in &categories {
            self.generate_listing(posts, &categories, &FilterState::select(label))?;
        }

        self.generate_post_pages(loader, posts)?;
        self.generate_pages(pages)?;
        self.generate_not_found()?;
        self.generate_sitemap(posts)?;

        Ok(())
    }

    /// Context variables every template expects
    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from_config(&self.app.config));
        context.insert(
            "current_year",
            &chrono::Local::now().format("%Y").to_string(),
        );
        context.insert("page_title", "");
        context
    }

    /// Render one listing: the home page for the unfiltered state, a
    /// category page otherwise
    fn generate_listing(
        &self,
        posts: &[Post],
        categories: &[String],
        state: &FilterState,
    ) -> Result<()> {
        let config = &self.app.config;

        let visible: Vec<PostItem> = view::visible_posts(posts, state)
            .into_iter()
            .map(|p| PostItem::from_post(p, config))
            .collect();
        let links = view::category_links(categories, state, config);

        let mut context = self.base_context();
        context.insert("posts", &visible);
        context.insert("category_links", &links);

        let output_path = match state.selected() {
            None => self.app.public_dir.join("index.html"),
            Some(label) => {
                context.insert("page_title", label);
                self.app
                    .public_dir
                    .join(config.category_dir.trim_matches('/'))
                    .join(slug::slugify(label))
                    .join("index.html")
            }
        };

        let html = self.renderer.render("index.html", &context)?;
        self.write_output(&output_path, &html)
    }

    /// Render every post, rendered body and copy buttons included
    fn generate_post_pages(&self, loader: &CatalogLoader, posts: &[Post]) -> Result<()> {
        for post in posts {
            let full = loader.get_post(&post.id)?;
            let content = attach_copy_buttons(full.content.as_deref().unwrap_or(""));

            let mut context = self.base_context();
            context.insert("page_title", &full.title);
            context.insert("page_date", &full.date.format("%Y-%m-%d").to_string());
            context.insert(
                "page_categories",
                &full.display_categories(&self.app.config.default_category),
            );
            context.insert("page_content", &content);

            let html = self.renderer.render("post.html", &context)?;

            // The directory uses the raw id; post.path carries the
            // percent-encoded form for hrefs
            let output_path = self
                .app
                .public_dir
                .join(self.app.config.post_dir.trim_matches('/'))
                .join(&full.id)
                .join("index.html");
            self.write_output(&output_path, &html)?;
        }

        Ok(())
    }

    fn generate_pages(&self, pages: &[Page]) -> Result<()> {
        for page in pages {
            let mut context = self.base_context();
            context.insert("page_title", &page.title);
            context.insert("page_content", &page.content);

            let html = self.renderer.render("page.html", &context)?;
            let output_path = self
                .app
                .public_dir
                .join(page.path.trim_matches('/'))
                .join("index.html");
            self.write_output(&output_path, &html)?;
        }

        Ok(())
    }

    fn generate_not_found(&self) -> Result<()> {
        let html = self.renderer.render("404.html", &self.base_context())?;
        self.write_output(&self.app.public_dir.join("404.html"), &html)
    }

    /// sitemap.xml with the home page and one entry per post
    fn generate_sitemap(&self, posts: &[Post]) -> Result<()> {
        let config = &self.app.config;
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();

        let mut xml = String::from(concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        ));

        xml.push_str(&sitemap_entry(
            &full_url_for(config, ""),
            &today,
            "daily",
            "1.0",
        ));
        for post in posts {
            xml.push_str(&sitemap_entry(
                &full_url_for(config, &post.path),
                &post.date.format("%Y-%m-%d").to_string(),
                "weekly",
                "0.7",
            ));
        }
        xml.push_str("</urlset>\n");

        self.write_output(&self.app.public_dir.join("sitemap.xml"), &xml)
    }

    /// Copy non-markdown source files (images and the like) through to
    /// the public directory, keeping their relative layout
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.app.source_dir;

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            // Markdown renders to HTML, it never copies through
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("markdown")
            ) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;

            // _-prefixed directories such as _posts hold sources
            if relative.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('_'))
                    .unwrap_or(false)
            }) {
                continue;
            }

            let dest = self.app.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }

    fn write_output(&self, output_path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, contents)?;
        tracing::debug!("Wrote {:?}", output_path);
        Ok(())
    }
}

fn sitemap_entry(loc: &str, lastmod: &str, changefreq: &str, priority: &str) -> String {
    format!(
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
        escape_xml(loc),
        lastmod,
        changefreq,
        priority
    )
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(dir: &Path) -> Wintery {
        Wintery::new(dir).unwrap()
    }

    fn write_post(app: &Wintery, name: &str, front_matter: &str, body: &str) {
        let posts_dir = app.posts_dir();
        fs::create_dir_all(&posts_dir).unwrap();
        fs::write(
            posts_dir.join(name),
            format!("---\n{}\n---\n\n{}\n", front_matter.trim(), body),
        )
        .unwrap();
    }

    fn generate(app: &Wintery) {
        let loader = CatalogLoader::new(app);
        let posts = loader.list_posts().unwrap();
        let pages = loader.load_pages().unwrap();
        let generator = Generator::new(app).unwrap();
        generator.generate(&loader, &posts, &pages).unwrap();
    }

    #[test]
    fn test_generate_site() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "a.md", "title: A\ndate: 2024-01-02\ncategory: go", "Alpha.");
        write_post(
            &app,
            "b.md",
            "title: B\ndate: 2024-01-03\ncategories: [rust, systems]",
            "```rust\nfn main() {}\n```",
        );
        let about = app.source_dir.join("about");
        fs::create_dir_all(&about).unwrap();
        fs::write(about.join("index.md"), "---\ntitle: About\n---\n\nHello.\n").unwrap();

        generate(&app);

        let public = &app.public_dir;
        assert!(public.join("index.html").exists());
        assert!(public.join("blog/a/index.html").exists());
        assert!(public.join("blog/b/index.html").exists());
        assert!(public.join("categories/rust/index.html").exists());
        assert!(public.join("categories/systems/index.html").exists());
        assert!(public.join("categories/go/index.html").exists());
        assert!(public.join("about/index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("sitemap.xml").exists());
        assert!(public.join("css/style.css").exists());
        assert!(public.join("js/copy-code.js").exists());
    }

    #[test]
    fn test_home_lists_posts_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "a.md", "title: A\ndate: 2024-01-02\ncategory: go", "x");
        write_post(&app, "b.md", "title: B\ndate: 2024-01-03\ncategory: rust", "x");

        generate(&app);

        let home = fs::read_to_string(app.public_dir.join("index.html")).unwrap();
        let pos_b = home.find(">B<").unwrap();
        let pos_a = home.find(">A<").unwrap();
        assert!(pos_b < pos_a);
    }

    #[test]
    fn test_category_page_filters_posts() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "a.md", "title: A\ndate: 2024-01-02\ncategory: go", "x");
        write_post(
            &app,
            "b.md",
            "title: B\ndate: 2024-01-03\ncategories: [rust, systems]",
            "x",
        );

        generate(&app);

        let go_page =
            fs::read_to_string(app.public_dir.join("categories/go/index.html")).unwrap();
        assert!(go_page.contains(">A<"));
        assert!(!go_page.contains(">B<"));

        // the active pill links back to the unfiltered home page
        assert!(go_page.contains(r#"class="category-pill active" href="/""#));
    }

    #[test]
    fn test_post_page_carries_copy_button() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(
            &app,
            "code.md",
            "title: Code\ndate: 2024-01-01",
            "```rust\nfn main() {}\n```",
        );

        generate(&app);

        let html = fs::read_to_string(app.public_dir.join("blog/code/index.html")).unwrap();
        assert!(html.contains("copy-button"));
        assert!(html.contains("js/copy-code.js"));
    }

    #[test]
    fn test_uncategorized_post_shows_fallback_label() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "n.md", "title: N\ndate: 2024-01-01", "x");

        generate(&app);

        let home = fs::read_to_string(app.public_dir.join("index.html")).unwrap();
        assert!(home.contains("General"));
        // but the fallback is not a filterable category
        assert!(!app.public_dir.join("categories/general").exists());
        assert_eq!(home.matches("category-pill").count(), 1);
    }

    #[test]
    fn test_sitemap_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "a.md", "title: A\ndate: 2024-01-02", "x");
        write_post(&app, "b.md", "title: B\ndate: 2024-01-03", "x");

        generate(&app);

        let sitemap = fs::read_to_string(app.public_dir.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<changefreq>daily</changefreq>"));
        assert!(sitemap.contains("<priority>1.0</priority>"));
        assert_eq!(sitemap.matches("<changefreq>weekly</changefreq>").count(), 2);
        assert!(sitemap.contains("http://example.com/blog/b/"));
        assert!(sitemap.contains("<lastmod>2024-01-03</lastmod>"));
    }

    #[test]
    fn test_source_assets_are_copied() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "a.md", "title: A\ndate: 2024-01-02", "x");
        let images = app.source_dir.join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("photo.png"), b"png bytes").unwrap();

        generate(&app);

        assert!(app.public_dir.join("images/photo.png").exists());
        // post sources are not copied through
        assert!(!app.public_dir.join("_posts").exists());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b<c>"), "a&amp;b&lt;c&gt;");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
