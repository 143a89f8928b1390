//! List site content

use anyhow::Result;
use std::path::Path;
use walkdir::WalkDir;

use crate::fetch::FsFetcher;
use crate::helpers::strip_html;
use crate::posts::fetch_posts;
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let fetcher = FsFetcher::new(&site.site_dir);
            let posts = fetch_posts(&fetcher, &site.config.posts_path).await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    strip_html(&post.name),
                    strip_html(&post.author),
                    post.image().unwrap_or("no image")
                );
            }
        }
        "partial" | "partials" => {
            let partials = find_partials(site);
            println!("Partials ({}):", partials.len());
            for fragment in partials {
                println!("  #{}", fragment);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, partials",
                content_type
            );
        }
    }

    Ok(())
}

/// Fragments that have a partial document, sorted.
///
/// Only top-level files count, since a fragment maps to `<fragment>.<ext>`
/// in the site root; the host page itself is skipped.
pub fn find_partials(site: &Site) -> Vec<String> {
    let extension = site.config.partial_extension.as_str();
    let index = Path::new(&site.config.index);

    let mut fragments: Vec<String> = WalkDir::new(&site.site_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some(extension))
        .filter(|e| Some(e.file_name()) != index.file_name())
        .filter_map(|e| {
            e.path()
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .collect();

    fragments.sort();
    fragments
}
