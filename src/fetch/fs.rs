//! Site directory backend

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::{Fetch, FetchError, Response};

/// Serves GETs from files under a root directory
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Map a request path onto the root, refusing anything that climbs out of it
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let clean_path = path.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(clean_path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            None
        } else {
            Some(self.root.join(relative))
        }
    }
}

#[async_trait]
impl Fetch for FsFetcher {
    async fn get(&self, path: &str) -> Result<Response, FetchError> {
        let Some(file_path) = self.resolve(path) else {
            tracing::debug!("Refusing path outside site root: {}", path);
            return Ok(Response::not_found());
        };

        // Bodies are decoded lossily, like a browser reading a mislabelled file
        match tokio::fs::read(&file_path).await {
            Ok(bytes) => {
                tracing::debug!("GET {} -> {:?}", path, file_path);
                Ok(Response::ok(String::from_utf8_lossy(&bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("GET {} -> not found", path);
                Ok(Response::not_found())
            }
            Err(e) => Err(e.into()),
        }
    }
}
