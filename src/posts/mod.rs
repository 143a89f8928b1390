//! Post list - fetched once at startup and rendered into the posts container

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::dom::{self, DomError, Element, SharedDocument};
use crate::fetch::{Fetch, FetchError};
use crate::helpers::TrustedHtml;

/// Errors that stop the post list from rendering
#[derive(Error, Debug)]
pub enum PostsError {
    #[error("Failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("Invalid posts document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// A post as published in the posts document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub name: String,
    pub author: String,
    /// HTML body
    pub content: String,
    /// Main image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Post {
    /// The image URL, treating an empty string as no image
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }
}

/// Fetch and parse the posts document at `path`
pub async fn fetch_posts(fetcher: &dyn Fetch, path: &str) -> Result<Vec<Post>, PostsError> {
    let response = fetcher
        .get(path)
        .await
        .map_err(|source| PostsError::Fetch {
            path: path.to_string(),
            source,
        })?;

    if !response.is_success() {
        tracing::warn!("GET {} returned status {}", path, response.status);
    }

    let posts: Vec<Post> = serde_json::from_str(&response.body)?;
    tracing::debug!("Loaded {} posts from {}", posts.len(), path);
    Ok(posts)
}

/// Build the block for one post:
/// `div.post > div.post-name, div.post-author, div.post-content, figure.post-main-image`
pub fn post_block(post: &Post, no_photo_text: &str) -> Element {
    let mut name = Element::new("div").with_class("post-name");
    name.set_inner_html(TrustedHtml::new(post.name.as_str()));

    let mut author = Element::new("div").with_class("post-author");
    author.set_inner_html(TrustedHtml::new(post.author.as_str()));

    let mut content = Element::new("div").with_class("post-content");
    content.set_inner_html(TrustedHtml::new(post.content.as_str()));

    let mut figure = Element::new("figure").with_class("post-main-image");
    match post.image() {
        Some(src) => {
            let mut img = Element::new("img");
            img.set_attribute("src", src);
            figure.append_child(img);
        }
        None => figure.append_text(no_photo_text),
    }

    let mut block = Element::new("div").with_class("post");
    block.append_child(name);
    block.append_child(author);
    block.append_child(content);
    block.append_child(figure);
    block
}

/// Post renderer settings, taken from the site configuration
#[derive(Debug, Clone)]
pub struct PostsOptions {
    pub posts_path: String,
    pub container_id: String,
    pub no_photo_text: String,
}

impl From<&SiteConfig> for PostsOptions {
    fn from(config: &SiteConfig) -> Self {
        Self {
            posts_path: config.posts_path.clone(),
            container_id: config.elements.posts.clone(),
            no_photo_text: config.no_photo_text.clone(),
        }
    }
}

impl Default for PostsOptions {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

pub struct PostRenderer {
    fetcher: Arc<dyn Fetch>,
    document: SharedDocument,
    options: PostsOptions,
}

impl PostRenderer {
    pub fn new(fetcher: Arc<dyn Fetch>, document: SharedDocument, options: PostsOptions) -> Self {
        Self {
            fetcher,
            document,
            options,
        }
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>, PostsError> {
        fetch_posts(self.fetcher.as_ref(), &self.options.posts_path).await
    }

    /// Append one block per post, in order. Returns the number appended.
    pub fn render_posts(&self, posts: &[Post]) -> Result<usize, DomError> {
        let mut document = dom::lock(&self.document);
        let container = document.require_mut(&self.options.container_id)?;

        for post in posts {
            container.append_child(post_block(post, &self.options.no_photo_text));
        }

        Ok(posts.len())
    }

    /// Fetch the posts and render them
    pub async fn run(&self) -> Result<usize, PostsError> {
        let posts = self.get_posts().await?;
        let count = self.render_posts(&posts)?;
        tracing::info!("Rendered {} posts", count);
        Ok(count)
    }
}
