//! Category filter state for the post listing

use indexmap::IndexSet;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::url::url_for;

/// Category selection for one browsing session. Each session owns its
/// own value; nothing here is shared or global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected: Option<String>,
}

impl FilterState {
    /// The unfiltered state showing every post
    pub fn all() -> Self {
        Self { selected: None }
    }

    /// A state with the given category selected
    pub fn select(label: &str) -> Self {
        Self {
            selected: Some(label.to_string()),
        }
    }

    /// The selected category label, if any
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_none()
    }

    /// The state after clicking `label`: clicking the already-selected
    /// category clears the filter, anything else selects it.
    pub fn toggle(&self, label: &str) -> FilterState {
        if self.selected.as_deref() == Some(label) {
            FilterState::all()
        } else {
            FilterState::select(label)
        }
    }
}

/// Distinct category labels across the given posts, in first-appearance
/// order. Uncategorized posts contribute nothing; their fallback label
/// is a display concern, not a filterable category.
pub fn compute_categories(posts: &[Post]) -> Vec<String> {
    let mut seen: IndexSet<String> = IndexSet::new();
    for post in posts {
        for label in &post.categories {
            seen.insert(label.clone());
        }
    }
    seen.into_iter().collect()
}

/// Posts visible under the given filter, preserving catalog order
pub fn visible_posts<'a>(posts: &'a [Post], state: &FilterState) -> Vec<&'a Post> {
    match state.selected() {
        None => posts.iter().collect(),
        Some(label) => posts
            .iter()
            .filter(|p| p.categories.iter().any(|c| c == label))
            .collect(),
    }
}

/// One filter control in the rendered category bar
#[derive(Debug, Clone, Serialize)]
pub struct CategoryLink {
    pub label: String,
    pub url: String,
    pub active: bool,
}

/// Filter controls for a page: "All" first, then one per category. Each
/// control links to the state reached by toggling it from `state`, so
/// the active category links back to the unfiltered listing.
pub fn category_links(
    categories: &[String],
    state: &FilterState,
    config: &SiteConfig,
) -> Vec<CategoryLink> {
    let mut links = Vec::with_capacity(categories.len() + 1);

    links.push(CategoryLink {
        label: "All".to_string(),
        url: url_for(config, ""),
        active: state.is_all(),
    });

    for label in categories {
        let url = match state.toggle(label).selected() {
            None => url_for(config, ""),
            Some(selected) => url_for(
                config,
                &format!(
                    "{}/{}/",
                    config.category_dir.trim_matches('/'),
                    slug::slugify(selected)
                ),
            ),
        };
        links.push(CategoryLink {
            label: label.clone(),
            url,
            active: state.selected() == Some(label.as_str()),
        });
    }

    links
}
