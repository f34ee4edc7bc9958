//! Structure, render and search a Markdown law document.
//!
//! Pipeline: `FootnoteRewriter::rewrite` → `parse_document` → `search` →
//! `Renderer::render`. Everything here is synchronous and free of I/O; the
//! server crate owns fetching and serving.
pub mod error;
pub mod footnote;
pub mod highlight;
pub mod html;
pub mod markdown;
pub mod model;
pub mod parser;
pub mod render;
pub mod search;

pub use error::CoreError;
pub use footnote::FootnoteRewriter;
pub use model::{Block, Document, Section, Subsection};
pub use parser::parse_document;
pub use render::{Containers, Renderer};
pub use search::{search, SearchView};

/// Rewrite footnotes and parse `source` in one step.
pub fn build_document(source: &str, rewriter: &FootnoteRewriter) -> Document {
    parse_document(&rewriter.rewrite(source))
}
