/// Markdown to HTML conversion and the plain-text projection used for search.
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::html::Fragment;

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render a block of Markdown to HTML. Raw inline HTML passes through.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render heading text as inline markup, without the paragraph wrapper a
/// standalone line would get.
pub fn render_inline(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options()).filter(|event| {
        !matches!(
            event,
            Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph)
        )
    });
    let mut out = String::with_capacity(markdown.len());
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

/// Tag-stripped text of an HTML fragment.
///
/// Entities are decoded, so `&lt;` would come back as `<`; angle brackets are
/// removed from the result so a projection never carries anything tag-like.
pub fn plain_text(html: &str) -> String {
    Fragment::parse(html)
        .text_content()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect()
}
