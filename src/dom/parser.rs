//! Host page parser
//!
//! A tolerant Lexer + tree builder for the host page markup. It understands
//! enough HTML to locate the page containers: elements with attributes, void
//! elements, comments, doctype and raw-text `script`/`style` bodies. Text is
//! kept exactly as written; attribute values have their character references
//! decoded, as `getAttribute` reports them.

use super::node::{Element, Node, VOID_ELEMENTS};
use crate::helpers::{decode_entities, TrustedHtml};

/// Elements whose body is not parsed as markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Text as written in the source
    Text(String),
    /// `<!-- ... -->`
    Comment(String),
    /// `<!DOCTYPE ...>` and other `<!...>` declarations
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
}

/// Lexer for HTML - uses character-based iteration to handle Unicode
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.pos < self.chars.len() {
            if self.starts_with("<!--") {
                tokens.push(self.read_comment());
            } else if self.starts_with("<!") {
                tokens.push(self.read_declaration());
            } else if self.starts_with("</") && self.peek_is_alpha(2) {
                tokens.push(self.read_end_tag());
            } else if self.current_char() == '<' && self.peek_is_alpha(1) {
                let token = self.read_start_tag();
                let raw_body = match &token {
                    Token::StartTag {
                        name,
                        self_closing: false,
                        ..
                    } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
                    _ => None,
                };
                tokens.push(token);
                if let Some(name) = raw_body {
                    let body = self.read_raw_text(&name);
                    if !body.is_empty() {
                        tokens.push(Token::Text(body));
                    }
                }
            } else {
                let text = self.read_text();
                if !text.is_empty() {
                    tokens.push(Token::Text(text));
                }
            }
        }

        tokens
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut pos = self.pos;
        for c in s.chars() {
            if pos >= self.chars.len() || self.chars[pos] != c {
                return false;
            }
            pos += 1;
        }
        true
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        let mut pos = self.pos;
        for c in s.chars() {
            if pos >= self.chars.len() || !self.chars[pos].eq_ignore_ascii_case(&c) {
                return false;
            }
            pos += 1;
        }
        true
    }

    fn peek_is_alpha(&self, offset: usize) -> bool {
        self.chars
            .get(self.pos + offset)
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
    }

    fn current_char(&self) -> char {
        if self.pos < self.chars.len() {
            self.chars[self.pos]
        } else {
            '\0'
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.current_char().is_whitespace() {
            self.pos += 1;
        }
    }

    fn read_text(&mut self) -> String {
        let mut result = String::new();
        // A lone '<' that starts no tag is text
        if self.current_char() == '<' {
            result.push('<');
            self.pos += 1;
        }
        while !self.at_end() && self.current_char() != '<' {
            result.push(self.current_char());
            self.pos += 1;
        }
        result
    }

    fn read_until(&mut self, terminator: &str) -> String {
        let mut result = String::new();
        while !self.at_end() && !self.starts_with(terminator) {
            result.push(self.current_char());
            self.pos += 1;
        }
        self.pos = (self.pos + terminator.chars().count()).min(self.chars.len());
        result
    }

    fn read_comment(&mut self) -> Token {
        self.pos += 4; // Skip <!--
        Token::Comment(self.read_until("-->"))
    }

    fn read_declaration(&mut self) -> Token {
        self.pos += 2; // Skip <!
        Token::Doctype(self.read_until(">"))
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while !self.at_end() {
            let c = self.current_char();
            if c.is_whitespace() || c == '>' || c == '/' || c == '=' {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        name.to_ascii_lowercase()
    }

    fn read_end_tag(&mut self) -> Token {
        self.pos += 2; // Skip </
        let name = self.read_name();
        self.read_until(">");
        Token::EndTag(name)
    }

    fn read_start_tag(&mut self) -> Token {
        self.pos += 1; // Skip <
        let name = self.read_name();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            if self.at_end() {
                break;
            }
            if self.current_char() == '>' {
                self.pos += 1;
                break;
            }
            if self.starts_with("/>") {
                self_closing = true;
                self.pos += 2;
                break;
            }
            if self.current_char() == '/' {
                self.pos += 1;
                continue;
            }

            let attr_name = self.read_name();
            if attr_name.is_empty() {
                // Stray '=' or similar; skip it
                self.pos += 1;
                continue;
            }

            self.skip_whitespace();
            let value = if self.current_char() == '=' {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attribute_value()
            } else {
                String::new()
            };
            attributes.push((attr_name, decode_entities(&value)));
        }

        Token::StartTag {
            name,
            attributes,
            self_closing,
        }
    }

    fn read_attribute_value(&mut self) -> String {
        match self.current_char() {
            quote @ ('"' | '\'') => {
                self.pos += 1;
                let mut value = String::new();
                while !self.at_end() && self.current_char() != quote {
                    value.push(self.current_char());
                    self.pos += 1;
                }
                self.pos = (self.pos + 1).min(self.chars.len());
                value
            }
            _ => {
                let mut value = String::new();
                while !self.at_end() {
                    let c = self.current_char();
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    self.pos += 1;
                }
                value
            }
        }
    }

    fn read_raw_text(&mut self, name: &str) -> String {
        let close = format!("</{}", name);
        let mut result = String::new();
        while !self.at_end() && !self.starts_with_ignore_case(&close) {
            result.push(self.current_char());
            self.pos += 1;
        }
        result
    }
}

/// Build a node list from markup
pub fn parse(markup: &str) -> Vec<Node> {
    let tokens = Lexer::new(markup).tokenize();
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => append(&mut stack, &mut roots, Node::Html(TrustedHtml::new(text))),
            Token::Comment(text) => append(&mut stack, &mut roots, Node::Comment(text)),
            Token::Doctype(text) => append(&mut stack, &mut roots, Node::Doctype(text)),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let mut element = Element::new(&name);
                for (key, value) in &attributes {
                    element.set_attribute(key, value);
                }
                if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
                    append(&mut stack, &mut roots, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Token::EndTag(name) => {
                // Stray end tags are dropped; unclosed children close with their parent
                if stack.iter().any(|el| el.tag() == name) {
                    while let Some(element) = stack.pop() {
                        let matched = element.tag() == name;
                        append(&mut stack, &mut roots, Node::Element(element));
                        if matched {
                            break;
                        }
                    }
                }
            }
        }
    }

    while let Some(element) = stack.pop() {
        append(&mut stack, &mut roots, Node::Element(element));
    }

    roots
}

fn append(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.append_node(node),
        None => roots.push(node),
    }
}
