//! HTTP backend

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{Fetch, FetchError, Response};

/// Requests files from a served site
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// `base` is the page URL; request paths resolve against it like relative links
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, path: &str) -> Result<Response, FetchError> {
        let url = self.base.join(path)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Response { status, body })
    }
}
