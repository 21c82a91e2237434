use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::backup;
use crate::config::Config;
use crate::error::SpliceError;
use crate::record::{display_date, PostRecord};
use crate::store::PostMap;

/// Opening splice marker in the listing page.
pub const GRID_MARKER: &str = "<div class=\"blog-grid\">";
const CARDS_BEGIN: &str = "<!-- Auto-generated blog cards -->";
const CARDS_END: &str = "<!-- End auto-generated cards -->";

/// Rebuild the card region of the listing page from the store. Everything
/// before the grid marker and from the closing </div> onward is preserved
/// byte-for-byte; the page text is untouched on error.
pub fn regenerate(page: &str, posts: &PostMap) -> Result<String, SpliceError> {
    let marker_pos = page.find(GRID_MARKER).ok_or(SpliceError::MarkerNotFound)?;
    let region_start = marker_pos + GRID_MARKER.len();

    // Skip a previously generated region (whose cards contain </div>) so a
    // re-run replaces it instead of splicing inside the first card.
    let close_from = page[region_start..]
        .find(CARDS_END)
        .map(|p| region_start + p + CARDS_END.len())
        .unwrap_or(region_start);
    let close_pos = page[close_from..]
        .find("</div>")
        .map(|p| close_from + p)
        .ok_or(SpliceError::StructureError)?;

    let mut published: Vec<&PostRecord> = posts.values().filter(|p| p.published).collect();
    // Newest first; the stored timestamp format sorts chronologically.
    published.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let cards: Vec<String> = published.iter().map(|p| render_card(p)).collect();

    Ok(format!(
        "{}\n\n                {}\n\n{}\n\n                {}\n\n            {}",
        &page[..region_start],
        CARDS_BEGIN,
        cards.join("\n\n                "),
        CARDS_END,
        &page[close_pos..],
    ))
}

fn render_card(post: &PostRecord) -> String {
    let date = display_date(&post.created_at);
    let data_series = if post.series.is_empty() {
        String::new()
    } else {
        format!("data-series=\"{}\"", post.series)
    };

    format!(
        r#"<div class="blog-card" {data_series}>
    <a href="{slug}.html">
        <div class="card-image-wrapper">
            <div class="card-category">{category}</div>
            <img loading="lazy" src="{image}" alt="{description}">
        </div>
        <div class="card-content">
            <h3>{title}</h3>
            <small class="card-meta">By {author} | {date}</small>
            <p>{description}</p>
        </div>
    </a>
</div>"#,
        data_series = data_series,
        slug = post.slug,
        category = post.post_type,
        image = post.image_url,
        description = post.description,
        title = post.title,
        author = post.author,
        date = date,
    )
}

/// Regenerate and write the listing page, backing up the previous content
/// first. The write is atomic; a splice failure leaves the page as it was.
pub fn refresh_listing(config: &Config, posts: &PostMap) -> Result<()> {
    let path = config.listing_page();
    let page = fs::read_to_string(&path)
        .with_context(|| format!("reading listing page {}", path.display()))?;

    let updated = regenerate(&page, posts)?;

    backup::create_backup(&path, &config.backup_dir)?;
    backup::write_atomic(&path, &updated)?;
    info!("Listing page updated: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PostType;

    const PAGE: &str = r#"<html>
<body>
    <main>
        <div class="blog-grid">
        </div>
    </main>
    <footer>kept</footer>
</body>
</html>"#;

    fn post(slug: &str, created_at: &str, series: &str, published: bool) -> PostRecord {
        PostRecord {
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            author: "The Team".to_string(),
            post_type: PostType::Article,
            description: format!("About {}", slug),
            image_url: "https://example.com/i.png".to_string(),
            series: series.to_string(),
            created_at: created_at.to_string(),
            modified_at: created_at.to_string(),
            published,
            ..Default::default()
        }
    }

    fn posts(records: &[PostRecord]) -> PostMap {
        records
            .iter()
            .map(|r| (r.slug.clone(), r.clone()))
            .collect()
    }

    #[test]
    fn regeneration_is_idempotent() {
        let map = posts(&[
            post("a", "2024-01-02 10:00:00", "", true),
            post("b", "2024-01-01 10:00:00", "after_hours", true),
        ]);
        let once = regenerate(PAGE, &map).unwrap();
        let twice = regenerate(&once, &map).unwrap();
        assert_eq!(once, twice);
        // No duplicate card accumulation.
        assert_eq!(twice.matches("blog-card").count(), 2);
    }

    #[test]
    fn boundaries_are_preserved() {
        let map = posts(&[post("a", "2024-01-02 10:00:00", "", true)]);
        let out = regenerate(PAGE, &map).unwrap();

        let marker_end = PAGE.find(GRID_MARKER).unwrap() + GRID_MARKER.len();
        assert_eq!(&out[..marker_end], &PAGE[..marker_end]);

        let tail = &PAGE[PAGE.find("</div>").unwrap()..];
        assert!(out.ends_with(tail));
    }

    #[test]
    fn newest_post_comes_first() {
        let map = posts(&[
            post("older", "2023-06-01 08:00:00", "", true),
            post("newer", "2024-06-01 08:00:00", "", true),
        ]);
        let out = regenerate(PAGE, &map).unwrap();
        assert!(out.find("newer.html").unwrap() < out.find("older.html").unwrap());
    }

    #[test]
    fn unpublished_posts_are_skipped() {
        let map = posts(&[
            post("live", "2024-01-01 00:00:00", "", true),
            post("draft", "2024-01-02 00:00:00", "", false),
        ]);
        let out = regenerate(PAGE, &map).unwrap();
        assert!(out.contains("live.html"));
        assert!(!out.contains("draft.html"));
    }

    #[test]
    fn series_attribute_only_when_set() {
        let map = posts(&[
            post("tagged", "2024-01-02 00:00:00", "cram_and_cry", true),
            post("plain", "2024-01-01 00:00:00", "", true),
        ]);
        let out = regenerate(PAGE, &map).unwrap();
        assert!(out.contains("data-series=\"cram_and_cry\""));
        assert_eq!(out.matches("data-series").count(), 1);
    }

    #[test]
    fn missing_marker_fails_without_output() {
        let err = regenerate("<html><div>no grid</div></html>", &PostMap::new()).unwrap_err();
        assert_eq!(err, SpliceError::MarkerNotFound);
    }

    #[test]
    fn missing_closing_div_is_a_structure_error() {
        let err = regenerate("<div class=\"blog-grid\">", &PostMap::new()).unwrap_err();
        assert_eq!(err, SpliceError::StructureError);
    }

    #[test]
    fn refresh_backs_up_and_rewrites_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            blog_dir: dir.path().join("blog"),
            backup_dir: dir.path().join("backups"),
            ..Default::default()
        };
        fs::create_dir_all(&config.blog_dir).unwrap();
        fs::write(config.listing_page(), PAGE).unwrap();

        let map = posts(&[post("a", "2024-01-02 10:00:00", "", true)]);
        refresh_listing(&config, &map).unwrap();

        let page = fs::read_to_string(config.listing_page()).unwrap();
        assert!(page.contains("a.html"));

        let backups: Vec<_> = fs::read_dir(&config.backup_dir)
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(backups.len(), 1);
        let name = backups[0].file_name();
        let name = name.to_str().unwrap();
        assert!(name.starts_with("index_") && name.ends_with(".bak"));
        // The backup holds the pre-splice content.
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), PAGE);
    }

    #[test]
    fn refresh_failure_leaves_the_page_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            blog_dir: dir.path().join("blog"),
            backup_dir: dir.path().join("backups"),
            ..Default::default()
        };
        fs::create_dir_all(&config.blog_dir).unwrap();
        fs::write(config.listing_page(), "<html>no grid here</html>").unwrap();

        let err = refresh_listing(&config, &PostMap::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SpliceError>(),
            Some(&SpliceError::MarkerNotFound)
        );
        assert_eq!(
            fs::read_to_string(config.listing_page()).unwrap(),
            "<html>no grid here</html>"
        );
        assert!(!config.backup_dir.exists());
    }

    #[test]
    fn empty_store_renders_empty_region() {
        let out = regenerate(PAGE, &PostMap::new()).unwrap();
        assert!(out.contains(GRID_MARKER));
        assert!(!out.contains("blog-card"));
        // Second pass still stable.
        assert_eq!(regenerate(&out, &PostMap::new()).unwrap(), out);
    }
}
