//! Post and page records

use chrono::NaiveDateTime;
use serde::Serialize;

/// One catalog entry, parsed from a markdown source file. Records are
/// built by the loader and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Stable identifier, the source filename without extension
    pub id: String,

    pub title: String,

    /// Publication date; the catalog sorts on it, newest first
    pub date: NaiveDateTime,

    /// Normalized category labels, possibly empty
    pub categories: Vec<String>,

    /// Rendered HTML body, only present on the single-post read path
    pub content: Option<String>,

    /// Source file, relative to the source directory
    pub source: String,

    /// Site-relative URL path, percent-encoded
    pub path: String,
}

impl Post {
    /// Category labels for display. Posts without any category show the
    /// configured fallback label; the stored record stays empty.
    pub fn display_categories(&self, fallback: &str) -> Vec<String> {
        if self.categories.is_empty() {
            vec![fallback.to_string()]
        } else {
            self.categories.clone()
        }
    }
}

/// A standalone page such as source/about/index.md
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,

    /// Rendered HTML body
    pub content: String,

    /// Source file, relative to the source directory
    pub source: String,

    /// Site-relative URL path
    pub path: String,
}
