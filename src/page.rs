//! Page runtime - boots both features and drives hash-change navigation
//!
//! Everything runs as tasks on the caller's runtime. The navigator and the
//! post renderer are spawned independently, so a failure in one never keeps
//! the other from finishing. Every [`HashChange`] seen on the location spawns
//! another navigation; those are not awaited in order, matching a page where
//! a slow partial does not block later clicks.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinSet;

use crate::config::SiteConfig;
use crate::dom::{self, Document, SharedDocument};
use crate::fetch::Fetch;
use crate::navigator::{HashChange, Location, Navigation, Navigator, NavigatorOptions, Startup};
use crate::posts::{PostRenderer, PostsOptions};

/// Which feature a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Navigator,
    Posts,
}

/// How a page task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Started(Startup),
    Navigated(Navigation),
    PostsRendered(usize),
    Failed { feature: Feature, error: String },
}

pub struct Page {
    document: SharedDocument,
    location: Location,
    navigator: Arc<Navigator>,
    posts: Arc<PostRenderer>,
    events: broadcast::Receiver<HashChange>,
    tasks: JoinSet<Outcome>,
}

impl Page {
    pub fn new(
        config: &SiteConfig,
        fetcher: Arc<dyn Fetch>,
        document: Document,
        location: Location,
    ) -> Self {
        let document = document.into_shared();
        // Subscribe before anything can change the hash
        let events = location.subscribe();

        let navigator = Navigator::new(
            fetcher.clone(),
            document.clone(),
            location.clone(),
            NavigatorOptions::from(config),
        );
        let posts = PostRenderer::new(fetcher, document.clone(), PostsOptions::from(config));

        Self {
            document,
            location,
            navigator: Arc::new(navigator),
            posts: Arc::new(posts),
            events,
            tasks: JoinSet::new(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn document(&self) -> SharedDocument {
        self.document.clone()
    }

    /// Current markup of the whole page
    pub fn html(&self) -> String {
        dom::lock(&self.document).to_html()
    }

    /// Start the navigator and the post renderer
    pub fn boot(&mut self) {
        tracing::info!("Booting page at {:?}", self.location.hash());

        let navigator = self.navigator.clone();
        self.tasks.spawn(async move {
            match navigator.start().await {
                Ok(startup) => Outcome::Started(startup),
                Err(e) => failed(Feature::Navigator, &e),
            }
        });

        let posts = self.posts.clone();
        self.tasks.spawn(async move {
            match posts.run().await {
                Ok(count) => Outcome::PostsRendered(count),
                Err(e) => failed(Feature::Posts, &e),
            }
        });
    }

    /// Change the location hash, as following a navbar link would
    pub fn visit(&self, fragment: &str) -> bool {
        self.location.set_hash(fragment)
    }

    /// Run until no task is pending and no hash change is queued
    pub async fn settle(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();

        loop {
            self.dispatch_events();
            match self.tasks.join_next().await {
                Some(Ok(outcome)) => outcomes.push(outcome),
                Some(Err(e)) => tracing::error!("Page task aborted: {}", e),
                None => {
                    self.dispatch_events();
                    if self.tasks.is_empty() {
                        break;
                    }
                }
            }
        }

        outcomes
    }

    /// Spawn one navigation per queued hash change
    fn dispatch_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(change) => {
                    tracing::debug!("hashchange {:?} -> {:?}", change.old_hash, change.new_hash);
                    self.spawn_navigation();
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    // The location already holds the newest hash
                    tracing::warn!("Missed {} hash changes", skipped);
                    self.spawn_navigation();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn spawn_navigation(&mut self) {
        let navigator = self.navigator.clone();
        self.tasks.spawn(async move {
            match navigator.navigate().await {
                Ok(navigation) => Outcome::Navigated(navigation),
                Err(e) => failed(Feature::Navigator, &e),
            }
        });
    }
}

fn failed(feature: Feature, error: &dyn std::error::Error) -> Outcome {
    tracing::error!("{:?} failed: {}", feature, error);
    Outcome::Failed {
        feature,
        error: error.to_string(),
    }
}
