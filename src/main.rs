mod author;
mod backup;
mod config;
mod error;
mod extract;
mod indexer;
mod listing;
mod record;
mod scanner;
mod series;
mod slug;
mod store;
mod template;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::record::{PostRecord, PostType};
use crate::store::{JsonStore, MetadataStore, PostMap};

#[derive(Parser)]
#[command(name = "blog_cms", about = "Static blog indexer and listing-page generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index blog documents that are not yet in the metadata store
    Index,
    /// Re-index every document, preserving curated fields and view counts
    Reindex,
    /// Regenerate the listing page card grid from the store
    Refresh,
    /// Create a new post from a template and refresh the listing page
    Create {
        #[arg(long)]
        title: String,
        /// article, poster, or video
        #[arg(long, default_value = "article")]
        post_type: PostType,
        #[arg(long)]
        description: String,
        /// Comma-separated keywords
        #[arg(long, default_value = "")]
        keywords: String,
        #[arg(long)]
        image_url: String,
        #[arg(long, default_value = "The Team")]
        author: String,
        /// Series key (e.g. after_hours); empty for none
        #[arg(long, default_value = "")]
        series: String,
        /// Required for video posts
        #[arg(long, default_value = "")]
        youtube_id: String,
        /// File holding the post body HTML
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// List all posts, newest first
    List,
    /// Search posts by title, description, keywords, or series
    Search { query: String },
    /// Delete a post and its document (a backup is kept)
    Delete {
        #[arg(long)]
        slug: String,
    },
    /// Show corpus statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let config = Config::default();
    config.ensure_directories()?;
    let store = JsonStore::new(&config.metadata_file);

    let result = match cli.command {
        Commands::Index => {
            let counts = indexer::index_new(&store, &config)?;
            counts.print();
            Ok(())
        }
        Commands::Reindex => {
            let counts = indexer::reindex_all(&store, &config)?;
            counts.print();
            Ok(())
        }
        Commands::Refresh => {
            let posts = store.load();
            listing::refresh_listing(&config, &posts)?;
            let published = posts.values().filter(|p| p.published).count();
            println!("Listing page refreshed ({} published posts).", published);
            Ok(())
        }
        Commands::Create {
            title,
            post_type,
            description,
            keywords,
            image_url,
            author,
            series,
            youtube_id,
            content_file,
        } => {
            let content = match content_file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading content file {}", path.display()))?,
                None => String::new(),
            };
            let record = author::create_post(
                &store,
                &config,
                author::NewPost {
                    title,
                    post_type,
                    description,
                    keywords,
                    image_url,
                    author,
                    series,
                    video_id: youtube_id,
                    content,
                },
            )?;
            listing::refresh_listing(&config, &store.load())?;
            println!("Created post: {} ({})", record.title, record.post_type);
            println!("  File: {}", config.document_path(&record.slug).display());
            println!("  URL:  {}/blog/{}.html", config.base_url, record.slug);
            Ok(())
        }
        Commands::List => {
            let posts = store.load();
            if posts.is_empty() {
                println!("No posts found.");
                return Ok(());
            }
            print_post_table(&posts);
            Ok(())
        }
        Commands::Search { query } => {
            if query.trim().is_empty() {
                println!("Search query cannot be empty.");
                return Ok(());
            }
            let posts = store.load();
            let hits = search_posts(&posts, &query);
            if hits.is_empty() {
                println!("No posts match '{}'.", query);
            } else {
                println!("{} posts match '{}':", hits.len(), query);
                for post in hits {
                    let series = series::display_name(&post.series).unwrap_or("-");
                    println!(
                        "  {} | {} | {} | {}",
                        post.slug, post.post_type, series, post.created_at
                    );
                }
            }
            Ok(())
        }
        Commands::Delete { slug } => {
            let record = author::delete_post(&store, &config, &slug)?;
            listing::refresh_listing(&config, &store.load())?;
            println!("Deleted post: {}", record.title);
            Ok(())
        }
        Commands::Stats => {
            let posts = store.load();
            print_stats(&posts);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn search_posts<'a>(posts: &'a PostMap, query: &str) -> Vec<&'a PostRecord> {
    let q = query.to_lowercase();
    posts
        .values()
        .filter(|p| {
            let series_name = series::display_name(&p.series).unwrap_or("");
            p.title.to_lowercase().contains(&q)
                || p.description.to_lowercase().contains(&q)
                || p.keywords.to_lowercase().contains(&q)
                || series_name.to_lowercase().contains(&q)
        })
        .collect()
}

fn print_post_table(posts: &PostMap) {
    let mut sorted: Vec<&PostRecord> = posts.values().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    println!(
        "{:>3} | {:<30} | {:<7} | {:<16} | {:<19} | {:<9}",
        "#", "Title", "Type", "Author", "Created", "Status"
    );
    println!("{}", "-".repeat(98));

    for (i, post) in sorted.iter().enumerate() {
        let status = if post.published { "published" } else { "draft" };
        println!(
            "{:>3} | {:<30} | {:<7} | {:<16} | {:<19} | {:<9}",
            i + 1,
            truncate(&post.title, 30),
            post.post_type.as_str(),
            truncate(&post.author, 16),
            post.created_at,
            status
        );
    }

    // Series assignments in a separate section to keep the table narrow.
    let with_series: Vec<_> = sorted.iter().filter(|p| !p.series.is_empty()).collect();
    if !with_series.is_empty() {
        println!("\n--- Series ---");
        for post in &with_series {
            let name = series::display_name(&post.series).unwrap_or(&post.series);
            println!("  {}: {}", truncate(&post.slug, 30), name);
        }
    }

    let scanned = sorted.iter().filter(|p| p.derived_from_scan).count();
    println!("\n{} posts | {} indexed from existing files", sorted.len(), scanned);
}

fn print_stats(posts: &PostMap) {
    let total = posts.len();
    let published = posts.values().filter(|p| p.published).count();
    let scanned = posts.values().filter(|p| p.derived_from_scan).count();

    println!("Total posts:        {}", total);
    println!("Published:          {}", published);
    println!("Drafts:             {}", total - published);
    println!("Indexed from files: {}", scanned);

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_series: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_author: BTreeMap<&str, usize> = BTreeMap::new();
    for post in posts.values() {
        *by_type.entry(post.post_type.as_str()).or_default() += 1;
        let series = series::display_name(&post.series).unwrap_or("No Series");
        *by_series.entry(series).or_default() += 1;
        *by_author.entry(post.author.as_str()).or_default() += 1;
    }

    if !by_type.is_empty() {
        println!("\nPosts by type:");
        for (name, count) in &by_type {
            println!("  {}: {}", name, count);
        }
        println!("\nPosts by series:");
        for (name, count) in &by_series {
            println!("  {}: {}", name, count);
        }
        println!("\nPosts by author:");
        for (name, count) in &by_author {
            println!("  {}: {}", name, count);
        }
    }

    let mut recent: Vec<&PostRecord> = posts.values().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if !recent.is_empty() {
        println!("\nRecent posts:");
        for post in recent.iter().take(5) {
            let day = post.created_at.split(' ').next().unwrap_or("");
            println!("  {} ({})", post.title, day);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
