use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use tracing::debug;

use crate::record::{content_digest, PostRecord, PostType, TIMESTAMP_FMT};
use crate::scanner;
use crate::series;

pub const DEFAULT_AUTHOR: &str = "The Team";
pub const DEFAULT_KEYWORDS: &str = "bandar sunway, blog";
pub const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/800x400/cccccc/000000?text=No+Image";

/// Accepted post-date formats, tried in order; the first parse wins.
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%d %b %Y"];

const DESCRIPTION_LIMIT: usize = 200;

/// Build a metadata record from one document. Malformed input degrades to
/// per-field defaults and never errors; only an unreadable document fails,
/// at the caller.
pub fn extract(path: &Path, html: &str, site_name: &str) -> PostRecord {
    let scan = scanner::scan(html);

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let suffix = format!(" - {}", site_name);
    let title = scan.title_text.replace(&suffix, "").trim().to_string();

    // Raw-substring priority cascade, independent of where the scanner
    // captured body text; the two can disagree on malformed markup.
    let post_type = if html.contains("poster-container") {
        PostType::Poster
    } else if html.contains("video-container") || !scan.video_id.is_empty() {
        PostType::Video
    } else {
        PostType::Article
    };

    let mut description = scan
        .meta_tags
        .get("description")
        .cloned()
        .unwrap_or_default();
    if description.is_empty() {
        description = scan
            .meta_tags
            .get("og:description")
            .cloned()
            .unwrap_or_default();
    }
    if description.is_empty() {
        description = summarize(&scan.body_text);
    }

    let keywords = match scan.meta_tags.get("keywords") {
        Some(k) if !k.is_empty() => k.clone(),
        _ => DEFAULT_KEYWORDS.to_string(),
    };

    let mut image_url = scan.meta_tags.get("og:image").cloned().unwrap_or_default();
    if image_url.is_empty() {
        image_url = scan
            .meta_tags
            .get("twitter:image")
            .cloned()
            .unwrap_or_default();
    }
    if image_url.is_empty() {
        image_url = PLACEHOLDER_IMAGE.to_string();
    }

    let author = if scan.author_text.is_empty() {
        DEFAULT_AUTHOR.to_string()
    } else {
        scan.author_text.clone()
    };

    let created_at = parse_post_date(&scan.date_text).unwrap_or_else(|| {
        debug!("No parseable date in {}, using file mtime", path.display());
        mtime_timestamp(path)
    });

    // Classified from the cleaned title, before the untitled fallback, so a
    // synthesized "Untitled (…)" slug never feeds the classifier.
    let series = series::classify(&title, &scan.body_text, &keywords).to_string();

    let title = if title.is_empty() {
        format!("Untitled ({})", slug)
    } else {
        title
    };

    PostRecord {
        slug,
        title,
        author,
        post_type,
        description,
        keywords,
        image_url,
        series,
        video_id: scan.video_id,
        created_at: created_at.clone(),
        modified_at: created_at,
        published: true,
        view_count: 0,
        content_digest: content_digest(html.as_bytes()),
        derived_from_scan: true,
    }
}

/// First 200 chars of the body plus an ellipsis; short bodies pass through
/// unmarked.
fn summarize(body: &str) -> String {
    if body.chars().count() > DESCRIPTION_LIMIT {
        let head: String = body.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

fn parse_post_date(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(midnight.format(TIMESTAMP_FMT).to_string());
        }
    }
    None
}

fn mtime_timestamp(path: &Path) -> String {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
    let stamp: DateTime<Local> = modified.map(Into::into).unwrap_or_else(Local::now);
    stamp.format(TIMESTAMP_FMT).to_string()
}
