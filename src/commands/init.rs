//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# hashpage configuration

# Site
title: hashpage

# Directory
site_dir: public
index: index.html

# Navigation
default_fragment: home
partial_extension: html
active_class: active
# Ignore partials that arrive after a newer navigation started
discard_stale_navigations: true

# Posts
posts_path: data/posts.json
no_photo_text: "(aún no hay foto...)"

# Host page container ids
elements:
  navbar: navbar
  content: content
  posts: posts

# Server
server:
  ip: localhost
  port: 4000
"#;

const INDEX: &str = r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>hashpage</title>
</head>
<body>
  <div id="navbar"><a href="#home">Home</a><a href="#about">About</a></div>
  <div id="content"></div>
  <div id="posts"></div>
</body>
</html>
"##;

const HOME: &str = "<h1>Home</h1>\n<p>Welcome! Pick a page from the navbar.</p>\n";

const ABOUT: &str = "<h1>About</h1>\n<p>Each page here is a partial loaded by its fragment.</p>\n";

const POSTS: &str = r#"[
  {
    "name": "Hello World",
    "author": "John Doe",
    "content": "<p>The first post.</p>",
    "image": "images/hello.png"
  },
  {
    "name": "Second Post",
    "author": "Jane Doe",
    "content": "<p>This one has no photo yet.</p>"
  }
]
"#;

/// Initialize a new site in the given directory.
///
/// Files that already exist are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let site_dir = target_dir.join("public");

    // Create directory structure
    fs::create_dir_all(site_dir.join("data"))?;
    fs::create_dir_all(site_dir.join("images"))?;

    write_if_missing(&target_dir.join("_config.yml"), CONFIG)?;
    write_if_missing(&site_dir.join("index.html"), INDEX)?;
    write_if_missing(&site_dir.join("home.html"), HOME)?;
    write_if_missing(&site_dir.join("about.html"), ABOUT)?;
    write_if_missing(&site_dir.join("data/posts.json"), POSTS)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::info!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}
