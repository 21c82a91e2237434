use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::record::{display_date, PostRecord, PostType};

fn template_path(config: &Config, post_type: PostType) -> PathBuf {
    let file = match post_type {
        PostType::Article => "_template_article.html",
        PostType::Poster => "_template_poster.html",
        PostType::Video => "_template_video.html",
    };
    config.templates_dir.join(file)
}

/// Render a full post document from the type's template. Placeholder tokens
/// are replaced literally, in no particular order and with no escaping;
/// callers pre-sanitize content that could itself contain a token.
pub fn render_post(config: &Config, record: &PostRecord, content: &str) -> Result<String> {
    let path = template_path(config, record.post_type);
    let template = fs::read_to_string(&path)
        .with_context(|| format!("template not found: {}", path.display()))?;

    let date = display_date(&record.created_at);
    let replacements = [
        ("{TITLE}", record.title.as_str()),
        ("{DESCRIPTION}", record.description.as_str()),
        ("{KEYWORDS}", record.keywords.as_str()),
        ("{SLUG}", record.slug.as_str()),
        ("{IMAGE_URL}", record.image_url.as_str()),
        ("{AUTHOR}", record.author.as_str()),
        ("{POST_DATE}", date.as_str()),
        ("{CONTENT}", content),
        ("{YOUTUBE_ID}", record.video_id.as_str()),
    ];

    let mut html = template;
    for (token, value) in replacements {
        html = html.replace(token, value);
    }
    Ok(html)
}
