use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Stored timestamp format. Lexicographic order on this format is also
/// chronological order, which the listing sort relies on.
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";
/// Human-facing date format used on cards and in rendered posts.
pub const DISPLAY_DATE_FMT: &str = "%b %d, %Y";

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostType {
    #[default]
    Article,
    Poster,
    Video,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Article => "Article",
            PostType::Poster => "Poster",
            PostType::Video => "Video",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Ok(PostType::Article),
            "poster" => Ok(PostType::Poster),
            "video" => Ok(PostType::Video),
            other => Err(format!(
                "unknown post type '{}' (expected article, poster, or video)",
                other
            )),
        }
    }
}

/// One metadata entry per document, keyed by slug in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub post_type: PostType,
    pub description: String,
    pub keywords: String,
    pub image_url: String,
    /// Series key or empty. Older store files predate series support, so the
    /// field defaults to empty on load.
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub video_id: String,
    pub created_at: String,
    pub modified_at: String,
    pub published: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub content_digest: String,
    #[serde(default)]
    pub derived_from_scan: bool,
}

/// md5 hex of the exact document bytes. Integrity and debugging only, never
/// deduplication.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Format a stored timestamp for display, falling back to today when the
/// stored value does not parse.
pub fn display_date(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FMT)
        .map(|dt| dt.format(DISPLAY_DATE_FMT).to_string())
        .unwrap_or_else(|_| Local::now().format(DISPLAY_DATE_FMT).to_string())
}

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FMT).to_string()
}

// ── Authoring-time validation ──

pub fn is_valid_video_id(id: &str) -> bool {
    VIDEO_ID_RE.is_match(id)
}

pub fn is_valid_image_url(url: &str) -> bool {
    Url::parse(url).map(|u| u.has_host()).unwrap_or(false)
}
