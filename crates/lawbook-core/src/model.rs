use serde::Serialize;

/// Appended to a section id to name the separator rendered after it.
pub const SEPARATOR_SUFFIX: &str = "-separator";

/// A parsed document: the chapters of the source in document order.
///
/// Built once per load and never mutated afterwards; display state lives in
/// `SearchView`, not here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn subsection_count(&self) -> usize {
        self.sections.iter().map(|s| s.subsections.len()).sum()
    }
}

/// A chapter introduced by a level-1 heading (`# ...`).
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// `sec-<n>`, 1-based within one parse
    pub id: String,
    /// Heading text as written, footnote anchors included
    pub title: String,
    /// Tag-stripped heading text, used as the navigation label
    pub plain_title: String,
    /// Heading rendered as inline HTML
    pub title_html: String,
    /// Content between the heading and the first subsection, if any
    pub intro: Option<Block>,
    pub subsections: Vec<Subsection>,
    /// Plain title and intro text; subsection text is not included
    pub search_text: String,
}

/// A block introduced by a level-2 heading (`## ...`).
#[derive(Debug, Clone, Serialize)]
pub struct Subsection {
    /// `<parent id>-sub-<m>`, 1-based within the parent
    pub id: String,
    pub title: String,
    pub plain_title: String,
    pub title_html: String,
    pub body: Option<Block>,
    /// Plain title and body text
    pub search_text: String,
}

/// Content lines flushed between two headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Raw Markdown lines joined with `\n`
    pub raw: String,
    pub html: String,
    /// Tag-stripped projection of `html`
    pub text: String,
}

impl Section {
    pub fn separator_id(&self) -> String {
        format!("{}{SEPARATOR_SUFFIX}", self.id)
    }

    pub fn intro_html(&self) -> Option<&str> {
        self.intro.as_ref().map(|b| b.html.as_str())
    }
}

impl Subsection {
    pub fn body_html(&self) -> Option<&str> {
        self.body.as_ref().map(|b| b.html.as_str())
    }
}
