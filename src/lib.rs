//! hashpage: a headless hash-routed page shell
//!
//! A site is a host page (`index.html`) with a navbar, a content container and
//! a posts container, plus one partial document per fragment and a JSON list
//! of posts. The [`page::Page`] runtime loads the host page, renders the posts
//! and swaps partials into the content container as the location hash changes.

pub mod commands;
pub mod config;
pub mod dom;
pub mod fetch;
pub mod helpers;
pub mod navigator;
pub mod page;
pub mod posts;
pub mod server;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dom::Document;
use fetch::{Fetch, FsFetcher};
use navigator::Location;
use page::Page;

/// The main site handle
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the host page, partials and data
    pub site_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)
                .with_context(|| format!("Failed to load {:?}", config_path))?
        } else {
            config::SiteConfig::default()
        };

        let site_dir = base_dir.join(&config.site_dir);

        Ok(Self {
            config,
            base_dir,
            site_dir,
        })
    }

    /// Path of the host page on disk
    pub fn index_path(&self) -> PathBuf {
        self.site_dir.join(&self.config.index)
    }

    /// Parse the host page from disk
    pub fn load_document(&self) -> Result<Document> {
        let index_path = self.index_path();
        let markup = std::fs::read_to_string(&index_path)
            .with_context(|| format!("Failed to read host page {:?}", index_path))?;
        Ok(Document::parse(&markup))
    }

    /// A page over the site directory on disk
    pub fn local_page(&self, location: Location) -> Result<Page> {
        let document = self.load_document()?;
        let fetcher: Arc<dyn Fetch> = Arc::new(FsFetcher::new(&self.site_dir));
        Ok(Page::new(&self.config, fetcher, document, location))
    }
}
