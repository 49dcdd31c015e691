//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content::CatalogLoader;
use crate::generator::Generator;
use crate::Wintery;

/// Build the whole site once
pub fn run(app: &Wintery) -> Result<()> {
    let started = std::time::Instant::now();

    let loader = CatalogLoader::new(app);
    let posts = loader.list_posts()?;
    let pages = loader.load_pages()?;
    tracing::info!("Loaded {} posts, {} pages", posts.len(), pages.len());

    Generator::new(app)?.generate(&loader, &posts, &pages)?;

    tracing::info!("Site built in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

/// Rebuild whenever the source tree or _config.yml changes
pub async fn watch(app: &Wintery) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |outcome| {
        if let Ok(event) = outcome {
            // Send fails only once the watch loop is gone
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&app.source_dir, notify::RecursiveMode::Recursive)?;

    let config_path = app.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // One save can fire several events; wait for a quiet gap so a
    // burst rebuilds once
    while rx.recv().is_ok() {
        while rx.recv_timeout(Duration::from_millis(300)).is_ok() {}

        tracing::info!("Change detected, rebuilding");
        if let Err(e) = run(app) {
            tracing::error!("Rebuild failed: {}", e);
        }
    }

    Ok(())
}
