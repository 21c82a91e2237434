use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

/// Paths and site constants. Defaults match the deployed blog layout.
#[derive(Debug, Clone)]
pub struct Config {
    pub blog_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub metadata_file: PathBuf,
    pub base_url: String,
    pub site_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blog_dir: PathBuf::from("blog"),
            templates_dir: PathBuf::from("templates"),
            backup_dir: PathBuf::from("backups"),
            metadata_file: PathBuf::from("posts_metadata.json"),
            base_url: "https://bandar-breakdowns.vercel.app".to_string(),
            site_name: "The Bandar Breakdowns".to_string(),
        }
    }
}

impl Config {
    /// The listing page lives inside the blog directory and is excluded from
    /// the corpus.
    pub fn listing_page(&self) -> PathBuf {
        self.blog_dir.join("index.html")
    }

    pub fn document_path(&self, slug: &str) -> PathBuf {
        self.blog_dir.join(format!("{}.html", slug))
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.blog_dir, &self.templates_dir, &self.backup_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating directory {}", dir.display()))?;
            debug!("Ensured directory exists: {}", dir.display());
        }
        Ok(())
    }
}
