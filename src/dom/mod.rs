//! Document model - the in-memory host page the features render into

mod node;
pub mod parser;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use node::{Element, Node};

/// Document lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Element not found: #{0}")]
    MissingElement(String),
}

/// Document shared between the navigator, the post renderer and the page
pub type SharedDocument = Arc<Mutex<Document>>;

/// Lock a shared document. Guards must not be held across an await.
pub fn lock(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A parsed page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse host page markup
    pub fn parse(markup: &str) -> Self {
        Self {
            nodes: parser::parse(markup),
        }
    }

    /// Wrap the document for sharing
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(el) => el.find_by_id(id),
            _ => None,
        })
    }

    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(el) => el.find_by_id_mut(id),
            _ => None,
        })
    }

    /// Like [`Document::get_element_by_id`], failing when the element is absent
    pub fn require(&self, id: &str) -> Result<&Element, DomError> {
        self.get_element_by_id(id)
            .ok_or_else(|| DomError::MissingElement(id.to_string()))
    }

    pub fn require_mut(&mut self, id: &str) -> Result<&mut Element, DomError> {
        self.get_element_by_id_mut(id)
            .ok_or_else(|| DomError::MissingElement(id.to_string()))
    }

    /// Serialise the document back to markup
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        node::write_nodes(&self.nodes, &mut out);
        out
    }
}
