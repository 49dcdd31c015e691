//! Post catalog - loads and orders content from the source directory

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Page, Post};
use crate::helpers::url::encode_segment;
use crate::Wintery;

/// Errors raised while loading the post catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("missing required field `{field}` in {}", file.display())]
    MissingField { field: &'static str, file: PathBuf },

    #[error("unparseable date `{value}` in {}", file.display())]
    InvalidDate { value: String, file: PathBuf },

    #[error("bad front-matter in {}: {message}", file.display())]
    FrontMatter { message: String, file: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Loads posts and pages from the source directory
pub struct CatalogLoader<'a> {
    app: &'a Wintery,
    renderer: MarkdownRenderer,
}

impl<'a> CatalogLoader<'a> {
    /// Create a new catalog loader
    pub fn new(app: &'a Wintery) -> Self {
        let renderer = MarkdownRenderer::with_options(
            &app.config.highlight.theme,
            app.config.highlight.enable,
        );
        Self { app, renderer }
    }

    /// All posts from source/_posts, newest first. Posts sharing a date
    /// keep their filename order. Content is left unrendered here; use
    /// [`get_post`](Self::get_post) for the full post.
    pub fn list_posts(&self) -> Result<Vec<Post>, CatalogError> {
        let posts_dir = self.app.posts_dir();
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        for path in markdown_files(&posts_dir) {
            posts.push(self.read_post(&path, false)?);
        }

        // Stable sort, so the filename order above breaks date ties
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(posts)
    }

    /// A single post by id (the filename without extension), with
    /// rendered HTML content
    pub fn get_post(&self, id: &str) -> Result<Post, CatalogError> {
        let posts_dir = self.app.posts_dir();
        if posts_dir.exists() {
            for path in markdown_files(&posts_dir) {
                if file_stem(&path) == id {
                    return self.read_post(&path, true);
                }
            }
        }
        Err(CatalogError::PostNotFound(id.to_string()))
    }

    /// All pages: markdown files under source/ outside the `_`-prefixed
    /// directories, in filename order
    pub fn load_pages(&self) -> Result<Vec<Page>, CatalogError> {
        let source_dir = &self.app.source_dir;
        if !source_dir.exists() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();
        for path in markdown_files(source_dir) {
            let relative = path.strip_prefix(source_dir).unwrap_or(&path);
            if in_special_dir(relative) {
                continue;
            }
            pages.push(self.read_page(&path)?);
        }

        Ok(pages)
    }

    fn read_post(&self, path: &Path, with_content: bool) -> Result<Post, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| CatalogError::FrontMatter {
            message: e.to_string(),
            file: path.to_path_buf(),
        })?;

        // Posts must carry a title and a date; a catalog entry without
        // them is a data error, not something to paper over
        let title = fm.title.clone().ok_or_else(|| CatalogError::MissingField {
            field: "title",
            file: path.to_path_buf(),
        })?;
        let date_raw = fm.date.clone().ok_or_else(|| CatalogError::MissingField {
            field: "date",
            file: path.to_path_buf(),
        })?;
        let date = fm.parse_date().ok_or_else(|| CatalogError::InvalidDate {
            value: date_raw,
            file: path.to_path_buf(),
        })?;

        let id = file_stem(path);

        let source = path
            .strip_prefix(&self.app.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let url_path = format!(
            "{}/{}/",
            self.app.config.post_dir.trim_matches('/'),
            encode_segment(&id)
        );

        let content = with_content.then(|| self.renderer.render(body));

        Ok(Post {
            id,
            title,
            date,
            categories: fm.normalized_categories(),
            content,
            source,
            path: url_path,
        })
    }

    fn read_page(&self, path: &Path) -> Result<Page, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| CatalogError::FrontMatter {
            message: e.to_string(),
            file: path.to_path_buf(),
        })?;

        let title = fm.title.clone().unwrap_or_else(|| file_stem(path));

        let source = path
            .strip_prefix(&self.app.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // index.md stands for its parent directory
        let without_ext = source.trim_end_matches(".md").trim_end_matches(".markdown");
        let page_path = match without_ext.strip_suffix("index") {
            Some(prefix) if prefix.is_empty() || prefix.ends_with('/') => prefix.to_string(),
            _ => format!("{}/", without_ext),
        };

        Ok(Page {
            title,
            content: self.renderer.render(body),
            source,
            path: page_path,
        })
    }
}

/// Markdown files under a directory, in filename order
fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_markdown(path))
        .collect()
}

/// Paths whose first component is `_`-prefixed (such as _posts) hold
/// special content, not pages
fn in_special_dir(relative: &Path) -> bool {
    relative
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .map(|first| first.starts_with('_'))
        .unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
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

    #[test]
    fn test_list_posts_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "a.md", "title: A\ndate: 2024-01-02\ncategory: go", "Alpha.");
        write_post(
            &app,
            "b.md",
            "title: B\ndate: 2024-01-03\ncategories: [rust, systems]",
            "Beta.",
        );

        let loader = CatalogLoader::new(&app);
        let posts = loader.list_posts().unwrap();

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(posts[0].categories, vec!["rust", "systems"]);
        assert_eq!(posts[1].categories, vec!["go"]);
        // the listing pass leaves content unrendered
        assert!(posts[0].content.is_none());
    }

    #[test]
    fn test_same_date_keeps_filename_order() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "b-second.md", "title: Second\ndate: 2024-05-01", "x");
        write_post(&app, "a-first.md", "title: First\ndate: 2024-05-01", "x");
        write_post(&app, "c-newer.md", "title: Newer\ndate: 2024-05-02", "x");

        let loader = CatalogLoader::new(&app);
        let posts = loader.list_posts().unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c-newer", "a-first", "b-second"]);
    }

    #[test]
    fn test_get_post_renders_content() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(
            &app,
            "hello.md",
            "title: Hello\ndate: 2024-01-01",
            "# Heading\n\nBody text.",
        );

        let loader = CatalogLoader::new(&app);
        let post = loader.get_post("hello").unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.path, "blog/hello/");
        let content = post.content.unwrap();
        assert!(content.contains("<h1>Heading</h1>"));
        assert!(content.contains("<p>Body text.</p>"));
    }

    #[test]
    fn test_get_post_unknown_id() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "hello.md", "title: Hello\ndate: 2024-01-01", "x");

        let loader = CatalogLoader::new(&app);
        let err = loader.get_post("nope").unwrap_err();
        assert!(matches!(err, CatalogError::PostNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_missing_title_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "bad.md", "date: 2024-01-01", "x");

        let loader = CatalogLoader::new(&app);
        let err = loader.list_posts().unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "title", .. }));
    }

    #[test]
    fn test_missing_date_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "bad.md", "title: No Date", "x");

        let loader = CatalogLoader::new(&app);
        let err = loader.list_posts().unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "date", .. }));
    }

    #[test]
    fn test_invalid_date_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "bad.md", "title: Bad\ndate: sometime soon", "x");

        let loader = CatalogLoader::new(&app);
        let err = loader.list_posts().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDate { .. }));
    }

    #[test]
    fn test_missing_posts_dir_is_empty_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());

        let loader = CatalogLoader::new(&app);
        assert!(loader.list_posts().unwrap().is_empty());
    }

    #[test]
    fn test_post_path_is_percent_encoded() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        write_post(&app, "hello world.md", "title: HW\ndate: 2024-01-01", "x");

        let loader = CatalogLoader::new(&app);
        let post = loader.get_post("hello world").unwrap();
        assert_eq!(post.path, "blog/hello%20world/");
    }

    #[test]
    fn test_load_pages() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        let about = app.source_dir.join("about");
        fs::create_dir_all(&about).unwrap();
        fs::write(about.join("index.md"), "---\ntitle: About\n---\n\nHi there.\n").unwrap();
        // posts live under _posts and are not pages
        write_post(&app, "p.md", "title: P\ndate: 2024-01-01", "x");

        let loader = CatalogLoader::new(&app);
        let pages = loader.load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "About");
        assert_eq!(pages[0].path, "about/");
        assert!(pages[0].content.contains("Hi there."));
    }

    #[test]
    fn test_page_title_falls_back_to_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let app = site(tmp.path());
        fs::create_dir_all(&app.source_dir).unwrap();
        fs::write(app.source_dir.join("contact.md"), "Just content.\n").unwrap();

        let loader = CatalogLoader::new(&app);
        let pages = loader.load_pages().unwrap();
        assert_eq!(pages[0].title, "contact");
        assert_eq!(pages[0].path, "contact/");
    }
}
