use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Config;
use crate::extract;
use crate::store::MetadataStore;

pub struct IndexCounts {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl IndexCounts {
    pub fn print(&self) {
        println!(
            "Indexed {} new posts ({} already indexed, {} failed).",
            self.inserted, self.skipped, self.failed,
        );
    }
}

pub struct ReindexCounts {
    pub updated: usize,
    pub failed: usize,
}

impl ReindexCounts {
    pub fn print(&self) {
        println!("Updated {} posts ({} failed).", self.updated, self.failed);
    }
}

/// All post documents in the blog directory, excluding the listing page.
/// Sorted so passes and counts are deterministic.
pub fn corpus_documents(config: &Config) -> Result<Vec<PathBuf>> {
    let mut docs = Vec::new();
    let entries = fs::read_dir(&config.blog_dir)
        .with_context(|| format!("reading corpus directory {}", config.blog_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some("index.html") {
            continue;
        }
        docs.push(path);
    }
    docs.sort();
    Ok(docs)
}

/// Index documents whose slug is not yet in the store. Existing slugs are
/// skipped untouched; the store is persisted only when something was added.
pub fn index_new(store: &dyn MetadataStore, config: &Config) -> Result<IndexCounts> {
    let mut posts = store.load();
    let docs = corpus_documents(config)?;

    let pb = progress_bar(docs.len());
    let mut counts = IndexCounts {
        inserted: 0,
        skipped: 0,
        failed: 0,
    };

    for path in &docs {
        let slug = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => {
                counts.failed += 1;
                pb.inc(1);
                continue;
            }
        };

        if posts.contains_key(&slug) {
            counts.skipped += 1;
            pb.inc(1);
            continue;
        }

        match fs::read_to_string(path) {
            Ok(html) => {
                let record = extract::extract(path, &html, &config.site_name);
                info!("Indexed: {} ({})", record.title, record.post_type);
                posts.insert(slug, record);
                counts.inserted += 1;
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                counts.failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if counts.inserted > 0 {
        store.save(&posts)?;
    }
    Ok(counts)
}

/// Re-extract every document, merging against the prior store snapshot:
/// `view_count` always survives, and records that were authored rather than
/// scanned additionally keep their curated `created_at`, `author`, and
/// `series`. One document failing never aborts the pass.
pub fn reindex_all(store: &dyn MetadataStore, config: &Config) -> Result<ReindexCounts> {
    store.backup(&config.backup_dir)?;

    let mut posts = store.load();
    let snapshot = posts.clone();
    let docs = corpus_documents(config)?;

    let pb = progress_bar(docs.len());
    let mut counts = ReindexCounts {
        updated: 0,
        failed: 0,
    };

    for path in &docs {
        match fs::read_to_string(path) {
            Ok(html) => {
                let mut record = extract::extract(path, &html, &config.site_name);
                if let Some(prior) = snapshot.get(&record.slug) {
                    record.view_count = prior.view_count;
                    if !prior.derived_from_scan {
                        record.created_at = prior.created_at.clone();
                        record.author = prior.author.clone();
                        record.series = prior.series.clone();
                    }
                }
                info!("Updated: {}", record.title);
                posts.insert(record.slug.clone(), record);
                counts.updated += 1;
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                counts.failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if counts.updated > 0 {
        store.save(&posts)?;
    }
    Ok(counts)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
