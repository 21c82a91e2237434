use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::backup;
use crate::record::PostRecord;

/// Slug-keyed post map. BTreeMap keeps iteration deterministic, which pins
/// listing tie-breaks and progress output.
pub type PostMap = BTreeMap<String, PostRecord>;

/// Persistence seam for the metadata store. The indexer only depends on
/// load-before-use and save-after-mutate.
pub trait MetadataStore {
    fn load(&self) -> PostMap;
    fn save(&self, posts: &PostMap) -> Result<()>;
    /// Timestamped copy of the persisted store, taken ahead of a bulk rewrite.
    fn backup(&self, backup_dir: &Path) -> Result<()>;
}

/// JSON file store: one object keyed by slug.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataStore for JsonStore {
    /// A missing file is an empty store; malformed JSON is logged and treated
    /// the same rather than aborting the caller.
    fn load(&self) -> PostMap {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => {
                info!("No existing metadata file at {}", self.path.display());
                return PostMap::new();
            }
        };
        match serde_json::from_str::<PostMap>(&text) {
            Ok(posts) => {
                info!("Loaded {} posts from {}", posts.len(), self.path.display());
                posts
            }
            Err(e) => {
                error!("Malformed metadata in {}: {}", self.path.display(), e);
                PostMap::new()
            }
        }
    }

    fn save(&self, posts: &PostMap) -> Result<()> {
        let json = serde_json::to_string_pretty(posts)?;
        backup::write_atomic(&self.path, &json)
            .with_context(|| format!("saving metadata to {}", self.path.display()))?;
        info!("Saved {} posts to {}", posts.len(), self.path.display());
        Ok(())
    }

    fn backup(&self, backup_dir: &Path) -> Result<()> {
        backup::create_backup(&self.path, backup_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PostType;

    fn record(slug: &str) -> PostRecord {
        PostRecord {
            slug: slug.to_string(),
            title: format!("Post {}", slug),
            author: "The Team".to_string(),
            post_type: PostType::Article,
            published: true,
            created_at: "2024-01-01 10:00:00".to_string(),
            modified_at: "2024-01-01 10:00:00".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("posts_metadata.json"));

        let mut posts = PostMap::new();
        posts.insert("a".to_string(), record("a"));
        posts.insert("b".to_string(), record("b"));
        store.save(&posts).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, posts);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("absent.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_json_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_metadata.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonStore::new(path).load().is_empty());
    }

    #[test]
    fn record_without_series_field_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts_metadata.json");
        // A pre-series store entry.
        fs::write(
            &path,
            r#"{"old-post":{"slug":"old-post","title":"Old","author":"The Team",
                "post_type":"Article","description":"d","keywords":"k",
                "image_url":"https://example.com/i.png",
                "created_at":"2023-05-01 00:00:00","modified_at":"2023-05-01 00:00:00",
                "published":true}}"#,
        )
        .unwrap();

        let posts = JsonStore::new(path).load();
        let post = &posts["old-post"];
        assert_eq!(post.series, "");
        assert_eq!(post.view_count, 0);
        assert!(!post.derived_from_scan);
    }
}
