//! Content module - posts, pages, front-matter and markdown rendering

mod catalog;
mod frontmatter;
mod markdown;
mod post;

pub use catalog::{CatalogError, CatalogLoader};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{Page, Post};
