//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Directory
    pub site_dir: String,
    pub index: String,

    // Navigation
    pub default_fragment: String,
    pub partial_extension: String,
    pub active_class: String,
    pub discard_stale_navigations: bool,

    // Posts
    pub posts_path: String,
    pub no_photo_text: String,

    // Host page
    #[serde(default)]
    pub elements: ElementIds,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "hashpage".to_string(),

            site_dir: "public".to_string(),
            index: "index.html".to_string(),

            default_fragment: "home".to_string(),
            partial_extension: "html".to_string(),
            active_class: "active".to_string(),
            discard_stale_navigations: true,

            posts_path: "data/posts.json".to_string(),
            no_photo_text: "(aún no hay foto...)".to_string(),

            elements: ElementIds::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Ids of the host page containers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub navbar: String,
    pub content: String,
    pub posts: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            navbar: "navbar".to_string(),
            content: "content".to_string(),
            posts: "posts".to_string(),
        }
    }
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
