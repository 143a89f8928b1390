//! Navigator - maps the location fragment to a partial and the active link
//!
//! Each navigation reads the fragment, marks the matching navbar link, loads
//! `<fragment>.html` (through the partial cache) and swaps it into the content
//! container. Navigations are numbered; when stale results are discarded, a
//! navigation whose content arrives after a newer one started leaves the
//! content container alone.

mod cache;
mod location;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use cache::PartialCache;
pub use location::{HashChange, Location};

use crate::config::SiteConfig;
use crate::dom::{self, DomError, SharedDocument};
use crate::fetch::Fetch;
use crate::helpers::TrustedHtml;

/// Navigator settings, taken from the site configuration
#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub default_fragment: String,
    pub partial_extension: String,
    pub navbar_id: String,
    pub content_id: String,
    pub active_class: String,
    pub discard_stale: bool,
}

impl From<&SiteConfig> for NavigatorOptions {
    fn from(config: &SiteConfig) -> Self {
        Self {
            default_fragment: config.default_fragment.clone(),
            partial_extension: config.partial_extension.clone(),
            navbar_id: config.elements.navbar.clone(),
            content_id: config.elements.content.clone(),
            active_class: config.active_class.clone(),
            discard_stale: config.discard_stale_navigations,
        }
    }
}

impl NavigatorOptions {
    /// Site-relative path of the partial document for a fragment
    pub fn partial_path(&self, fragment: &str) -> String {
        format!("{}.{}", fragment, self.partial_extension)
    }
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

/// Result of a single navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The partial was written into the content container
    Applied { fragment: String },
    /// A newer navigation started first; the content was left untouched
    Superseded { fragment: String },
}

/// What startup did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    /// No fragment was present; the hash was set and its change event drives navigation
    Defaulted { fragment: String },
    Navigated(Navigation),
}

pub struct Navigator {
    fetcher: Arc<dyn Fetch>,
    document: SharedDocument,
    location: Location,
    cache: PartialCache,
    generation: AtomicU64,
    options: NavigatorOptions,
}

impl Navigator {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        document: SharedDocument,
        location: Location,
        options: NavigatorOptions,
    ) -> Self {
        Self {
            fetcher,
            document,
            location,
            cache: PartialCache::new(),
            generation: AtomicU64::new(0),
            options,
        }
    }

    pub fn cache(&self) -> &PartialCache {
        &self.cache
    }

    /// Content for a fragment, from the cache or `<fragment>.<ext>`.
    ///
    /// Any completed response is accepted and cached verbatim, whatever its
    /// status. A transport failure yields empty content and caches nothing.
    pub async fn get_content(&self, fragment: &str) -> TrustedHtml {
        if let Some(html) = self.cache.get(fragment) {
            tracing::debug!("Partial cache hit: {}", fragment);
            return html;
        }

        let path = self.options.partial_path(fragment);
        tracing::debug!("Partial cache miss: {}, fetching {}", fragment, path);

        match self.fetcher.get(&path).await {
            Ok(response) => {
                if !response.is_success() {
                    tracing::warn!("GET {} returned status {}", path, response.status);
                }
                let html = TrustedHtml::new(response.body);
                self.cache.insert(fragment, html.clone());
                html
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", path, e);
                TrustedHtml::default()
            }
        }
    }

    /// Mark the navbar link targeting `fragment` and clear all the others
    pub fn set_active_link(&self, fragment: &str) -> Result<(), DomError> {
        let mut document = dom::lock(&self.document);
        let navbar = document.require_mut(&self.options.navbar_id)?;

        for link in navbar.children_mut() {
            let is_active = link
                .get_attribute("href")
                .map(|href| href.strip_prefix('#').unwrap_or(href) == fragment)
                .unwrap_or(false);

            if is_active {
                link.set_attribute("class", &self.options.active_class);
            } else {
                link.remove_attribute("class");
            }
        }

        Ok(())
    }

    /// Show the partial for the current fragment.
    ///
    /// The content container is updated even when the navbar is missing; that
    /// error is reported afterwards.
    pub async fn navigate(&self) -> Result<Navigation, DomError> {
        let fragment = self.location.fragment();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Navigating to #{} (generation {})", fragment, generation);

        let active = self.set_active_link(&fragment);
        let content = self.get_content(&fragment).await;

        if self.options.discard_stale && self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale content for #{}", fragment);
            active?;
            return Ok(Navigation::Superseded { fragment });
        }

        {
            let mut document = dom::lock(&self.document);
            document
                .require_mut(&self.options.content_id)?
                .set_inner_html(content);
        }
        active?;

        Ok(Navigation::Applied { fragment })
    }

    /// Navigate to the current fragment, or set the default one.
    ///
    /// Setting the default hash emits a [`HashChange`]; whoever listens to the
    /// location performs that navigation.
    pub async fn start(&self) -> Result<Startup, DomError> {
        if self.location.hash().is_empty() {
            let fragment = self.options.default_fragment.clone();
            tracing::info!("No fragment in location, defaulting to #{}", fragment);
            self.location.set_hash(&fragment);
            return Ok(Startup::Defaulted { fragment });
        }

        Ok(Startup::Navigated(self.navigate().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::fetch::mock::MockFetcher;
    use crate::fetch::Response;

    const PAGE: &str = r##"<div id="navbar"><a href="#home">Home</a><a href="#about">About</a></div><div id="content"></div>"##;

    fn navigator(fetcher: &Arc<MockFetcher>, location: Location, discard_stale: bool) -> Navigator {
        let options = NavigatorOptions {
            discard_stale,
            ..NavigatorOptions::default()
        };
        Navigator::new(
            fetcher.clone(),
            Document::parse(PAGE).into_shared(),
            location,
            options,
        )
    }

    fn content(navigator: &Navigator) -> String {
        dom::lock(&navigator.document)
            .require("content")
            .unwrap()
            .inner_html()
    }

    fn class_of(navigator: &Navigator, href: &str) -> Option<String> {
        let document = dom::lock(&navigator.document);
        let class = document
            .require("navbar")
            .unwrap()
            .children()
            .find(|link| link.get_attribute("href") == Some(href))
            .and_then(|link| link.get_attribute("class").map(str::to_string));
        class
    }

    #[tokio::test]
    async fn test_second_request_is_a_cache_hit() {
        let fetcher = Arc::new(MockFetcher::new().with("about.html", "<h1>About</h1>"));
        let navigator = navigator(&fetcher, Location::new(), true);

        let first = navigator.get_content("about").await;
        let second = navigator.get_content("about").await;

        assert_eq!(first, TrustedHtml::new("<h1>About</h1>"));
        assert_eq!(second, first);
        assert_eq!(fetcher.requests(), vec!["about.html"]);
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_caches_exact_body() {
        let fetcher = Arc::new(MockFetcher::new().with("home.html", "  <p>home</p>\n"));
        let navigator = navigator(&fetcher, Location::new(), true);

        assert!(!navigator.cache().contains("home"));
        navigator.get_content("home").await;

        assert_eq!(fetcher.request_count("home.html"), 1);
        assert_eq!(
            navigator.cache().get("home"),
            Some(TrustedHtml::new("  <p>home</p>\n"))
        );
    }

    #[tokio::test]
    async fn test_error_status_body_is_cached_verbatim() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond(
            "missing.html",
            Response {
                status: 404,
                body: "<h1>Not Found</h1>".to_string(),
            },
        );
        let navigator = navigator(&fetcher, Location::new(), true);

        assert_eq!(navigator.get_content("missing").await.as_str(), "<h1>Not Found</h1>");
        assert!(navigator.cache().contains("missing"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_empty_and_uncached() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.fail("down.html");
        let navigator = navigator(&fetcher, Location::new(), true);

        assert!(navigator.get_content("down").await.is_empty());
        assert!(!navigator.cache().contains("down"));

        navigator.get_content("down").await;
        assert_eq!(fetcher.request_count("down.html"), 2);
    }

    #[tokio::test]
    async fn test_set_active_link_toggles_class() {
        let fetcher = Arc::new(MockFetcher::new());
        let navigator = navigator(&fetcher, Location::new(), true);

        navigator.set_active_link("about").unwrap();
        assert_eq!(class_of(&navigator, "#about").as_deref(), Some("active"));
        assert_eq!(class_of(&navigator, "#home"), None);

        navigator.set_active_link("home").unwrap();
        assert_eq!(class_of(&navigator, "#home").as_deref(), Some("active"));
        assert_eq!(class_of(&navigator, "#about"), None);

        navigator.set_active_link("elsewhere").unwrap();
        assert_eq!(class_of(&navigator, "#home"), None);
        assert_eq!(class_of(&navigator, "#about"), None);
    }

    #[tokio::test]
    async fn test_missing_navbar_is_reported() {
        let fetcher = Arc::new(MockFetcher::new().with("home.html", "home"));
        let navigator = Navigator::new(
            fetcher.clone(),
            Document::parse(r#"<div id="content"></div>"#).into_shared(),
            Location::with_hash("home"),
            NavigatorOptions::default(),
        );

        assert_eq!(
            navigator.set_active_link("home"),
            Err(DomError::MissingElement("navbar".to_string()))
        );
        // Content still lands before the navbar error surfaces
        assert!(navigator.navigate().await.is_err());
        assert_eq!(content(&navigator), "home");
    }

    #[tokio::test]
    async fn test_navigate_replaces_content_and_marks_link() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with("home.html", "<h1>Home</h1>")
                .with("about.html", "<h1>About</h1>"),
        );
        let location = Location::with_hash("about");
        let navigator = navigator(&fetcher, location.clone(), true);

        assert_eq!(
            navigator.navigate().await.unwrap(),
            Navigation::Applied {
                fragment: "about".to_string()
            }
        );
        assert_eq!(content(&navigator), "<h1>About</h1>");
        assert_eq!(class_of(&navigator, "#about").as_deref(), Some("active"));

        location.set_hash("home");
        navigator.navigate().await.unwrap();
        assert_eq!(content(&navigator), "<h1>Home</h1>");
        assert_eq!(class_of(&navigator, "#about"), None);
    }

    #[tokio::test]
    async fn test_start_without_fragment_sets_default_hash() {
        let fetcher = Arc::new(MockFetcher::new().with("home.html", "<h1>Home</h1>"));
        let location = Location::new();
        let mut events = location.subscribe();
        let navigator = navigator(&fetcher, location.clone(), true);

        assert_eq!(
            navigator.start().await.unwrap(),
            Startup::Defaulted {
                fragment: "home".to_string()
            }
        );
        assert_eq!(location.hash(), "#home");
        assert_eq!(events.try_recv().unwrap().new_hash, "#home");
        // The change event drives the actual navigation
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_start_with_fragment_navigates_immediately() {
        let fetcher = Arc::new(MockFetcher::new().with("about.html", "<h1>About</h1>"));
        let navigator = navigator(&fetcher, Location::with_hash("about"), true);

        let startup = navigator.start().await.unwrap();
        assert!(matches!(startup, Startup::Navigated(Navigation::Applied { .. })));
        assert_eq!(content(&navigator), "<h1>About</h1>");
    }

    async fn race(discard_stale: bool) -> (Navigation, Navigation, String) {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with("slow.html", "slow")
                .with("fast.html", "fast"),
        );
        fetcher.hold("slow.html");
        let location = Location::with_hash("slow");
        let navigator = Arc::new(navigator(&fetcher, location.clone(), discard_stale));

        let slow = tokio::spawn({
            let navigator = navigator.clone();
            async move { navigator.navigate().await.unwrap() }
        });
        // Let the slow navigation reach its fetch before moving on
        while fetcher.request_count("slow.html") == 0 {
            tokio::task::yield_now().await;
        }

        location.set_hash("fast");
        let fast = navigator.navigate().await.unwrap();
        fetcher.release("slow.html");
        let slow = slow.await.unwrap();

        (slow, fast, content(&navigator))
    }

    #[tokio::test]
    async fn test_stale_navigation_is_discarded() {
        let (slow, fast, content) = race(true).await;
        assert!(matches!(slow, Navigation::Superseded { .. }));
        assert!(matches!(fast, Navigation::Applied { .. }));
        assert_eq!(content, "fast");
    }

    #[tokio::test]
    async fn test_stale_navigation_wins_when_not_discarded() {
        let (slow, _, content) = race(false).await;
        assert!(matches!(slow, Navigation::Applied { .. }));
        assert_eq!(content, "slow");
    }

    #[tokio::test]
    async fn test_navigators_do_not_share_caches() {
        let fetcher = Arc::new(MockFetcher::new().with("home.html", "home"));
        let first = navigator(&fetcher, Location::new(), true);
        let second = navigator(&fetcher, Location::new(), true);

        first.get_content("home").await;
        assert!(second.cache().is_empty());
        second.get_content("home").await;
        assert_eq!(fetcher.request_count("home.html"), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_fetch_and_last_response_wins() {
        let fetcher = Arc::new(MockFetcher::new().with("news.html", "first"));
        fetcher.hold("news.html");
        let navigator = Arc::new(navigator(&fetcher, Location::new(), true));

        let spawn_get = || {
            let navigator = navigator.clone();
            tokio::spawn(async move { navigator.get_content("news").await })
        };
        let a = spawn_get();
        let b = spawn_get();
        // No in-flight deduplication: both callers reach the fetcher
        while fetcher.request_count("news.html") < 2 {
            tokio::task::yield_now().await;
        }

        fetcher.release("news.html");
        while !navigator.cache().contains("news") {
            tokio::task::yield_now().await;
        }
        assert_eq!(navigator.cache().get("news"), Some(TrustedHtml::new("first")));

        fetcher.respond("news.html", Response::ok("second"));
        fetcher.release("news.html");
        let mut bodies = vec![
            a.await.unwrap().as_str().to_string(),
            b.await.unwrap().as_str().to_string(),
        ];
        bodies.sort();

        assert_eq!(bodies, vec!["first", "second"]);
        assert_eq!(navigator.cache().get("news"), Some(TrustedHtml::new("second")));
        assert_eq!(fetcher.request_count("news.html"), 2);
    }

    #[tokio::test]
    async fn test_partial_with_invalid_utf8_is_cached() {
        use crate::fetch::FsFetcher;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("latin.html"), b"<p>se\xf1or</p>").unwrap();
        let navigator = Navigator::new(
            Arc::new(FsFetcher::new(dir.path())),
            Document::parse(PAGE).into_shared(),
            Location::with_hash("latin"),
            NavigatorOptions::default(),
        );

        navigator.navigate().await.unwrap();
        assert_eq!(content(&navigator), "<p>se\u{fffd}or</p>");
        assert!(navigator.cache().contains("latin"));
    }

    #[tokio::test]
    async fn test_active_link_matches_decoded_href() {
        let fetcher = Arc::new(MockFetcher::new());
        let navigator = Navigator::new(
            fetcher,
            Document::parse(r##"<div id="navbar"><a href="#caf&eacute;">Caf&eacute;</a></div>"##)
                .into_shared(),
            Location::new(),
            NavigatorOptions::default(),
        );

        navigator.set_active_link("café").unwrap();
        assert_eq!(class_of(&navigator, "#café").as_deref(), Some("active"));
    }
}
