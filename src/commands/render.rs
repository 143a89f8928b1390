//! Render the page headlessly

use anyhow::{Context, Result};
use std::sync::Arc;
use url::Url;

use crate::dom::Document;
use crate::fetch::{Fetch, HttpFetcher};
use crate::navigator::Location;
use crate::page::{Outcome, Page};
use crate::Site;

/// Boot the page, follow `visits` as hash changes and return the final markup.
///
/// With `url` the host page and every file come from a running server and the
/// initial fragment is the URL's; otherwise they are read from the site directory.
pub async fn run(site: &Site, url: Option<Url>, visits: &[String]) -> Result<String> {
    let mut page = match url {
        Some(url) => remote_page(site, url).await?,
        None => site.local_page(Location::new())?,
    };

    page.boot();
    report(&page.settle().await);

    for fragment in visits {
        if page.visit(fragment) {
            report(&page.settle().await);
        } else {
            tracing::info!("Already at #{}", fragment);
        }
    }

    tracing::info!(
        "Cached partials: {}",
        page.navigator().cache().fragments().join(", ")
    );

    Ok(page.html())
}

async fn remote_page(site: &Site, url: Url) -> Result<Page> {
    let fetcher = HttpFetcher::new(url.clone());
    let response = fetcher
        .get(&site.config.index)
        .await
        .with_context(|| format!("Failed to fetch host page from {}", url))?;
    if !response.is_success() {
        anyhow::bail!("Host page {} returned status {}", url, response.status);
    }

    let fetcher: Arc<dyn Fetch> = Arc::new(fetcher);
    Ok(Page::new(
        &site.config,
        fetcher,
        Document::parse(&response.body),
        Location::from_url(&url),
    ))
}

fn report(outcomes: &[Outcome]) {
    for outcome in outcomes {
        match outcome {
            Outcome::Failed { feature, error } => {
                tracing::warn!("{:?} did not complete: {}", feature, error)
            }
            other => tracing::debug!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_site;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_render_local_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let site = Site::new(dir.path()).unwrap();

        let html = run(&site, None, &[]).await.unwrap();
        assert!(html.contains("<h1>Home</h1>"));
        assert!(html.contains(r##"<a href="#home" class="active">Home</a>"##));
        assert!(html.contains(r#"<div class="post-name">Hello World</div>"#));
        assert!(html.contains(r#"<img src="images/hello.png">"#));
        assert!(html.contains("(aún no hay foto...)"));
    }

    #[tokio::test]
    async fn test_render_with_visits() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let site = Site::new(dir.path()).unwrap();

        let html = run(&site, None, &["about".to_string()]).await.unwrap();
        assert!(html.contains("<h1>About</h1>"));
        assert!(!html.contains("<h1>Home</h1>"));
        assert!(html.contains(r##"<a href="#about" class="active">About</a>"##));
    }

    #[tokio::test]
    async fn test_render_survives_broken_posts() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::write(site.site_dir.join("data/posts.json"), "not json").unwrap();

        let html = run(&site, None, &[]).await.unwrap();
        assert!(html.contains("<h1>Home</h1>"));
        assert!(html.contains(r#"<div id="posts"></div>"#));
    }
}
