//! Fetch backends - plain GETs of the site's static files
//!
//! The page features only ever issue `GET <path>` relative to the site root.
//! [`FsFetcher`] reads the files straight from the site directory and
//! [`HttpFetcher`] requests them from a running server.

mod fs;
mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

pub use self::fs::FsFetcher;
pub use self::http::HttpFetcher;

/// Transport failures. A response with an error status is not a failure.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A completed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a GET for a path relative to the site root
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, path: &str) -> Result<Response, FetchError>;
}
