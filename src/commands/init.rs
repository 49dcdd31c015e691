//! Set up a fresh blog directory

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Wintery configuration

# Identity
title: Wintery
description: ''
author: Your Name
language: en

# Addressing: url is the deployed domain, root the path under it
url: http://example.com
root: /

# Layout on disk
source_dir: source
public_dir: public
post_dir: blog
category_dir: categories

# Authoring
new_post_name: :title.md
default_category: General

# Syntax highlighting
highlight:
  enable: true
  theme: base16-ocean.dark
"#;

const ABOUT_TEMPLATE: &str = r#"---
title: About
---

Say something about yourself here.
"#;

/// Create the directory skeleton and starter files for a new blog
pub fn init_site(target_dir: &Path) -> Result<()> {
    let posts_dir = target_dir.join("source/_posts");
    let about_dir = target_dir.join("source/about");
    fs::create_dir_all(&posts_dir)?;
    fs::create_dir_all(&about_dir)?;

    fs::write(target_dir.join("_config.yml"), CONFIG_TEMPLATE)?;
    fs::write(posts_dir.join("hello-world.md"), sample_post())?;
    fs::write(about_dir.join("index.md"), ABOUT_TEMPLATE)?;

    Ok(())
}

/// The starter post, dated now. Shows a highlighted code block and the
/// two ways of tagging categories.
fn sample_post() -> String {
    format!(
        r#"---
title: Hello World
date: {}
categories:
  - notes
---

Welcome to your new blog. Edit or delete this post, then start writing.

## Code blocks

Fenced code blocks are highlighted and get a copy button:

```rust
fn main() {{
    println!("hello, blog");
}}
```

## Categories

Give a post one category:

```yaml
category: notes
```

or several:

```yaml
categories:
  - rust
  - systems
```

Posts without a category show up under "General".
"#,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
