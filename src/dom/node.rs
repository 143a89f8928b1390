//! Element and node types of the document tree

use crate::helpers::{attr_escape, html_escape, TrustedHtml};

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Plain text, escaped when serialised
    Text(String),
    /// Markup inserted verbatim
    Html(TrustedHtml),
    Comment(String),
    Doctype(String),
}

impl Node {
    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text(text) => out.push_str(&html_escape(text)),
            Node::Html(html) => out.push_str(html.as_str()),
            Node::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Node::Doctype(text) => {
                out.push_str("<!");
                out.push_str(text);
                out.push('>');
            }
        }
    }
}

/// An element with ordered attributes and child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builder-style `class` attribute
    pub fn with_class(mut self, class: &str) -> Self {
        self.set_attribute("class", class);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    /// Direct child elements
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn append_child(&mut self, child: Element) {
        self.nodes.push(Node::Element(child));
    }

    pub fn append_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn append_text(&mut self, text: &str) {
        self.nodes.push(Node::Text(text.to_string()));
    }

    /// Replace all children with trusted markup
    pub fn set_inner_html(&mut self, html: TrustedHtml) {
        self.nodes.clear();
        if !html.is_empty() {
            self.nodes.push(Node::Html(html));
        }
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Depth-first search for an element carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children().find_map(|child| child.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children_mut().find_map(|child| child.find_by_id_mut(id))
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&attr_escape(value));
            out.push('"');
        }
        out.push('>');

        if self.is_void() {
            return;
        }

        for node in &self.nodes {
            node.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

pub(super) fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        node.write_html(out);
    }
}
