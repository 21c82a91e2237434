use std::sync::LazyLock;

use regex::Regex;

use crate::store::PostMap;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static INVALID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-]+").unwrap());
static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Derive a URL-safe slug from a title, unique against the store. Collisions
/// get `-1`, `-2`, … suffixes in first-come order. An empty title normalizes
/// to an empty base and resolves to `-1`, `-2`, …; callers that care reject
/// empty titles before allocating.
pub fn allocate(title: &str, existing: &PostMap) -> String {
    let base = normalize(title);

    let mut slug = base.clone();
    let mut counter = 1;
    while existing.contains_key(&slug) || slug.is_empty() {
        slug = format!("{}-{}", base, counter);
        counter += 1;
    }
    slug
}

fn normalize(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(lowered.trim(), "-");
    let cleaned = INVALID_RE.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN_RE.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}
