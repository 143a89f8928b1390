//! Partial content cache

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::helpers::TrustedHtml;

/// Fetched partial bodies keyed by fragment identifier.
///
/// Entries are only ever added or overwritten, never evicted.
#[derive(Debug, Default)]
pub struct PartialCache {
    entries: Mutex<HashMap<String, TrustedHtml>>,
}

impl PartialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fragment: &str) -> Option<TrustedHtml> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(fragment)
            .cloned()
    }

    /// Store a body, replacing any earlier one for the same fragment
    pub fn insert(&self, fragment: &str, html: TrustedHtml) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fragment.to_string(), html);
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(fragment)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached fragments in sorted order
    pub fn fragments(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
