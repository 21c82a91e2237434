use std::fs;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::backup;
use crate::config::Config;
use crate::error::ValidationError;
use crate::record::{
    content_digest, is_valid_image_url, is_valid_video_id, now_timestamp, PostRecord, PostType,
};
use crate::series;
use crate::slug;
use crate::store::MetadataStore;
use crate::template;

/// Authoring input, validated before any record exists.
pub struct NewPost {
    pub title: String,
    pub post_type: PostType,
    pub description: String,
    pub keywords: String,
    pub image_url: String,
    pub author: String,
    pub series: String,
    pub video_id: String,
    pub content: String,
}

pub fn validate(new: &NewPost) -> Result<(), ValidationError> {
    if new.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if new.description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if !is_valid_image_url(&new.image_url) {
        return Err(ValidationError::BadImageUrl(new.image_url.clone()));
    }
    if !new.series.is_empty() && !series::is_known_key(&new.series) {
        return Err(ValidationError::UnknownSeries(new.series.clone()));
    }
    if new.post_type == PostType::Video && new.video_id.is_empty() {
        return Err(ValidationError::MissingVideoId);
    }
    if !new.video_id.is_empty() && !is_valid_video_id(&new.video_id) {
        return Err(ValidationError::BadVideoId(new.video_id.clone()));
    }
    Ok(())
}

/// Render and write a new post document, then record it in the store. The
/// slug is allocated against existing entries; an existing document at the
/// target path is backed up before being replaced.
pub fn create_post(
    store: &dyn MetadataStore,
    config: &Config,
    new: NewPost,
) -> Result<PostRecord> {
    validate(&new)?;

    let mut posts = store.load();
    let slug = slug::allocate(&new.title, &posts);
    let now = now_timestamp();

    let mut record = PostRecord {
        slug: slug.clone(),
        title: new.title,
        author: new.author,
        post_type: new.post_type,
        description: new.description,
        keywords: new.keywords,
        image_url: new.image_url,
        series: new.series,
        video_id: new.video_id,
        created_at: now.clone(),
        modified_at: now,
        published: true,
        view_count: 0,
        content_digest: String::new(),
        derived_from_scan: false,
    };

    let html = template::render_post(config, &record, &new.content)?;
    record.content_digest = content_digest(html.as_bytes());

    let doc_path = config.document_path(&slug);
    backup::create_backup(&doc_path, &config.backup_dir)?;
    backup::write_atomic(&doc_path, &html)
        .with_context(|| format!("writing post {}", doc_path.display()))?;
    info!("Post file created: {}", doc_path.display());

    posts.insert(slug, record.clone());
    store.save(&posts)?;
    Ok(record)
}

/// Remove a post's record and its document, keeping a backup of the document.
pub fn delete_post(store: &dyn MetadataStore, config: &Config, slug: &str) -> Result<PostRecord> {
    let mut posts = store.load();
    let record = posts
        .remove(slug)
        .ok_or_else(|| anyhow!("post not found: {}", slug))?;

    let doc_path = config.document_path(slug);
    if doc_path.exists() {
        backup::create_backup(&doc_path, &config.backup_dir)?;
        fs::remove_file(&doc_path)
            .with_context(|| format!("deleting {}", doc_path.display()))?;
    }

    store.save(&posts)?;
    info!("Deleted post: {}", slug);
    Ok(record)
}
