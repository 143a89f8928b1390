//! Page location - the URL fragment and its change notifications

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use url::Url;

/// Capacity of the hash-change channel
const EVENT_CAPACITY: usize = 64;

/// Emitted whenever the location hash changes value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashChange {
    pub old_hash: String,
    pub new_hash: String,
}

/// The current location hash, shared by every clone
#[derive(Debug, Clone)]
pub struct Location {
    hash: Arc<Mutex<String>>,
    events: broadcast::Sender<HashChange>,
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}

impl Location {
    /// A location without a fragment
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            hash: Arc::new(Mutex::new(String::new())),
            events,
        }
    }

    /// A location starting at `hash` (with or without the leading `#`)
    pub fn with_hash(hash: &str) -> Self {
        let location = Self::new();
        *location.hash.lock().unwrap_or_else(PoisonError::into_inner) = normalize(hash);
        location
    }

    /// A location starting at the fragment of a page URL
    pub fn from_url(url: &Url) -> Self {
        Self::with_hash(url.fragment().unwrap_or_default())
    }

    /// `#fragment`, or an empty string when there is no fragment
    pub fn hash(&self) -> String {
        self.hash
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The fragment identifier without the leading `#`
    pub fn fragment(&self) -> String {
        let hash = self.hash();
        hash.strip_prefix('#').unwrap_or(&hash).to_string()
    }

    /// Set the hash, notifying subscribers when the value changes.
    ///
    /// Returns whether a notification was emitted.
    pub fn set_hash(&self, hash: &str) -> bool {
        let new_hash = normalize(hash);
        let old_hash = {
            let mut current = self.hash.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == new_hash {
                return false;
            }
            std::mem::replace(&mut *current, new_hash.clone())
        };

        tracing::debug!("Location hash {:?} -> {:?}", old_hash, new_hash);
        // No receivers just means nobody is listening yet
        let _ = self.events.send(HashChange { old_hash, new_hash });
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HashChange> {
        self.events.subscribe()
    }
}

/// `home` and `#home` both become `#home`; a bare `#` means no fragment
fn normalize(hash: &str) -> String {
    let fragment = hash.strip_prefix('#').unwrap_or(hash);
    if fragment.is_empty() {
        String::new()
    } else {
        format!("#{}", fragment)
    }
}
