//! Draft new posts and pages

use anyhow::Result;
use std::fs;

use crate::Wintery;

/// Create a new post, or a standalone page when `page` is set
pub fn create(
    app: &Wintery,
    title: &str,
    categories: &[String],
    page: bool,
    path: Option<&str>,
) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    let file_path = if page {
        let dir = app.source_dir.join(&slug);
        fs::create_dir_all(&dir)?;
        dir.join("index.md")
    } else {
        let posts_dir = app.posts_dir();
        fs::create_dir_all(&posts_dir)?;

        let filename = if let Some(p) = path {
            format!("{}.md", p)
        } else {
            app.config
                .new_post_name
                .replace(":title", &slug)
                .replace(":year", &now.format("%Y").to_string())
                .replace(":month", &now.format("%m").to_string())
                .replace(":day", &now.format("%d").to_string())
        };
        posts_dir.join(filename)
    };

    if file_path.exists() {
        anyhow::bail!("{} already exists", file_path.display());
    }

    let content = if page {
        format!("---\ntitle: {}\n---\n\n", title)
    } else {
        let mut front = format!(
            "---\ntitle: {}\ndate: {}\n",
            title,
            now.format("%Y-%m-%d %H:%M:%S")
        );
        if !categories.is_empty() {
            front.push_str("categories:\n");
            for category in categories {
                front.push_str(&format!("  - {}\n", category));
            }
        }
        front.push_str("---\n\n");
        front
    };

    fs::write(&file_path, content)?;
    println!("Created {}", file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;

    #[test]
    fn test_create_post_with_categories() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Wintery::new(tmp.path()).unwrap();
        create(
            &app,
            "My New Post",
            &["rust".to_string(), "notes".to_string()],
            false,
            None,
        )
        .unwrap();

        let path = app.posts_dir().join("my-new-post.md");
        assert!(path.exists());

        let raw = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&raw).unwrap();
        assert_eq!(fm.title, Some("My New Post".to_string()));
        assert_eq!(fm.normalized_categories(), vec!["rust", "notes"]);
        assert!(fm.date.is_some());
    }

    #[test]
    fn test_create_post_twice_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Wintery::new(tmp.path()).unwrap();
        create(&app, "Dup", &[], false, None).unwrap();
        assert!(create(&app, "Dup", &[], false, None).is_err());
    }

    #[test]
    fn test_create_page() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Wintery::new(tmp.path()).unwrap();
        create(&app, "Links", &[], true, None).unwrap();
        assert!(app.source_dir.join("links/index.md").exists());
    }

    #[test]
    fn test_explicit_path_overrides_pattern() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Wintery::new(tmp.path()).unwrap();
        create(&app, "Custom", &[], false, Some("2024-custom-name")).unwrap();
        assert!(app.posts_dir().join("2024-custom-name.md").exists());
    }
}
