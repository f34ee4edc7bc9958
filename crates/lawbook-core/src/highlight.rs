/// Keyword highlighting over rendered HTML.
///
/// The markup is parsed into a `Fragment` and every text leaf is rebuilt with
/// each case-insensitive occurrence of the keyword wrapped in `<mark>`. Text
/// under `mark`, `script` and `style` is left alone.
use regex::{Regex, RegexBuilder};

use crate::error::CoreError;
use crate::html::{Element, Fragment, Node, Visitor};

pub const MARK_TAG: &str = "mark";

const VERBATIM_TAGS: &[&str] = &[MARK_TAG, "script", "style"];

pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// The keyword is matched literally. An empty keyword highlights nothing.
    pub fn new(keyword: &str) -> Result<Self, CoreError> {
        if keyword.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Highlighted copy of `html`. Markup without any occurrence comes back
    /// byte for byte.
    pub fn highlight(&self, html: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return html.to_string();
        };
        let fragment = Fragment::parse(html);
        if !pattern.is_match(&fragment.text_content()) {
            return html.to_string();
        }
        let mut visitor = MarkVisitor { pattern };
        fragment.transform(&mut visitor).to_string()
    }
}

struct MarkVisitor<'a> {
    pattern: &'a Regex,
}

impl Visitor for MarkVisitor<'_> {
    fn visit_text(&mut self, text: &str) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut last = 0;
        for found in self.pattern.find_iter(text) {
            if found.start() > last {
                nodes.push(Node::Text(text[last..found.start()].to_string()));
            }
            nodes.push(Node::Element(
                Element::new(MARK_TAG).with_children(vec![Node::Text(found.as_str().to_string())]),
            ));
            last = found.end();
        }
        if last < text.len() {
            nodes.push(Node::Text(text[last..].to_string()));
        }
        nodes
    }

    fn descend(&self, element: &Element) -> bool {
        !VERBATIM_TAGS.contains(&element.name.as_str())
    }
}
