//! Remove generated output

use anyhow::Result;
use std::fs;

use crate::Wintery;

/// Delete the public directory if it exists
pub fn run(app: &Wintery) -> Result<()> {
    if app.public_dir.exists() {
        fs::remove_dir_all(&app.public_dir)?;
        tracing::info!("Deleted {}", app.public_dir.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_public_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Wintery::new(tmp.path()).unwrap();
        fs::create_dir_all(app.public_dir.join("blog")).unwrap();
        fs::write(app.public_dir.join("index.html"), "x").unwrap();

        run(&app).unwrap();
        assert!(!app.public_dir.exists());

        // cleaning an already clean site is fine
        run(&app).unwrap();
    }
}
