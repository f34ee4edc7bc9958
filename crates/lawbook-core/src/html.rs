/// A small HTML fragment tree built on top of the `html5gum` tokenizer.
///
/// Rendered Markdown is parsed into a `Fragment`, rewritten through a
/// `Visitor` and serialized back to markup. The tree builder is deliberately
/// forgiving: void elements never take children, stray end tags are dropped and
/// anything still open at the end of the input is closed implicitly.
use std::fmt;

use html5gum::{DefaultEmitter, Token, Tokenizer};
use tracing::debug;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Rebuilds a fragment node by node.
///
/// `visit_text` returns the nodes that replace a text leaf; `descend` decides
/// whether the children of an element are visited at all. Elements that are
/// not descended into are copied unchanged.
pub trait Visitor {
    fn visit_text(&mut self, text: &str) -> Vec<Node>;

    fn descend(&self, _element: &Element) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Vec<Node> = Vec::new();

        // Without state switching the tokenizer reads `<` inside script and
        // style bodies as markup.
        let mut emitter = DefaultEmitter::default();
        emitter.switch_states(true);

        for token in Tokenizer::new_with_emitter(html, emitter).infallible() {
            match token {
                Token::StartTag(tag) => {
                    let element = Element {
                        name: lossy(&tag.name).to_ascii_lowercase(),
                        attributes: tag
                            .attributes
                            .iter()
                            .map(|(key, value)| (lossy(key), lossy(value)))
                            .collect(),
                        children: Vec::new(),
                    };
                    if tag.self_closing || element.is_void() {
                        push_node(&mut stack, &mut root, Node::Element(element));
                    } else {
                        stack.push(element);
                    }
                }
                Token::EndTag(tag) => {
                    let name = lossy(&tag.name).to_ascii_lowercase();
                    let Some(pos) = stack.iter().rposition(|el| el.name == name) else {
                        debug!(tag = %name, "dropping unmatched end tag");
                        continue;
                    };
                    while stack.len() > pos {
                        if let Some(element) = stack.pop() {
                            push_node(&mut stack, &mut root, Node::Element(element));
                        }
                    }
                }
                Token::String(text) => push_text(&mut stack, &mut root, &lossy(&text)),
                Token::Comment(text) => push_node(&mut stack, &mut root, Node::Comment(lossy(&text))),
                Token::Doctype(_) => {}
                Token::Error(err) => debug!(error = %err, "html tokenizer error"),
            }
        }

        while let Some(element) = stack.pop() {
            push_node(&mut stack, &mut root, Node::Element(element));
        }

        Self { nodes: root }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Decoded text of every text leaf, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    pub fn transform<V: Visitor>(&self, visitor: &mut V) -> Fragment {
        Fragment {
            nodes: transform_nodes(&self.nodes, visitor),
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn push_node(stack: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn push_text(stack: &mut [Element], root: &mut Vec<Node>, text: &str) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    if let Some(Node::Text(prev)) = siblings.last_mut() {
        prev.push_str(text);
    } else {
        siblings.push(Node::Text(text.to_string()));
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Comment(_) => {}
        }
    }
}

fn transform_nodes<V: Visitor>(nodes: &[Node], visitor: &mut V) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => out.extend(visitor.visit_text(text)),
            Node::Element(element) if visitor.descend(element) => {
                out.push(Node::Element(Element {
                    name: element.name.clone(),
                    attributes: element.attributes.clone(),
                    children: transform_nodes(&element.children, visitor),
                }));
            }
            other => out.push(other.clone()),
        }
    }
    out
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write_node(f, node, false)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, false)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, raw_text: bool) -> fmt::Result {
    match node {
        Node::Text(text) if raw_text => f.write_str(text),
        Node::Text(text) => f.write_str(&escape_text(text)),
        Node::Comment(text) => write!(f, "<!--{text}-->"),
        Node::Element(element) => {
            write!(f, "<{}", element.name)?;
            for (key, value) in &element.attributes {
                write!(f, " {key}=\"{}\"", escape_attribute(value))?;
            }
            f.write_str(">")?;
            if element.is_void() {
                return Ok(());
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&element.name.as_str());
            for child in &element.children {
                write_node(f, child, raw)?;
            }
            write!(f, "</{}>", element.name)
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
