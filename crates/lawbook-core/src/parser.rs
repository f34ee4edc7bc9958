/// Structural parser for the law document.
///
/// The Markdown has a two-level outline:
/// - Chapter headers: `# Title`
/// - Subsection headers: `## Title`
/// - Anything else, blank lines included, is content of the innermost open block
///
/// Parser approach: line-by-line scan with a section cursor, a subsection flag
/// and a line buffer that is flushed whenever a heading is seen.
use regex::Regex;
use tracing::debug;

use crate::markdown::{plain_text, render_inline, render_markdown};
use crate::model::{Block, Document, Section, Subsection};

/// Parse footnote-rewritten Markdown into sections and subsections.
///
/// A `##` heading before any `#` heading opens an untitled placeholder
/// section. Content before the first heading has no owner and is dropped.
pub fn parse_document(content: &str) -> Document {
    let section_re = Regex::new(r"^#\s+(.+)\s*$").expect("valid regex");
    let subsection_re = Regex::new(r"^##\s+(.+)\s*$").expect("valid regex");

    let mut builder = DocumentBuilder::default();
    for line in content.lines() {
        if let Some(caps) = section_re.captures(line) {
            builder.flush();
            builder.start_section(caps[1].trim());
        } else if let Some(caps) = subsection_re.captures(line) {
            builder.flush();
            builder.start_subsection(caps[1].trim());
        } else {
            builder.buffer.push(line);
        }
    }
    builder.flush();

    if builder.dropped_lines > 0 {
        debug!(
            lines = builder.dropped_lines,
            "dropped content before the first heading"
        );
    }

    let document = Document {
        sections: builder.sections,
    };
    debug!(
        sections = document.sections.len(),
        subsections = document.subsection_count(),
        "parsed document"
    );
    document
}

#[derive(Default)]
struct DocumentBuilder<'a> {
    sections: Vec<Section>,
    subsection_open: bool,
    buffer: Vec<&'a str>,
    dropped_lines: usize,
}

impl DocumentBuilder<'_> {
    fn start_section(&mut self, title: &str) {
        let id = format!("sec-{}", self.sections.len() + 1);
        let (title_html, plain_title) = render_title(title);
        self.sections.push(Section {
            id,
            title: title.to_string(),
            search_text: plain_title.clone(),
            plain_title,
            title_html,
            intro: None,
            subsections: Vec::new(),
        });
        self.subsection_open = false;
    }

    fn start_subsection(&mut self, title: &str) {
        if self.sections.is_empty() {
            debug!(title, "subsection before any section, opening placeholder");
            self.start_section("");
        }
        let Some(section) = self.sections.last_mut() else {
            return;
        };
        let id = format!("{}-sub-{}", section.id, section.subsections.len() + 1);
        let (title_html, plain_title) = render_title(title);
        section.subsections.push(Subsection {
            id,
            title: title.to_string(),
            search_text: plain_title.clone(),
            plain_title,
            title_html,
            body: None,
        });
        self.subsection_open = true;
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let raw = self.buffer.join("\n");
        let line_count = self.buffer.len();
        self.buffer.clear();

        let Some(section) = self.sections.last_mut() else {
            self.dropped_lines += line_count;
            return;
        };

        let block = render_block(raw);
        if self.subsection_open {
            if let Some(subsection) = section.subsections.last_mut() {
                subsection.search_text = join_search_text(&subsection.plain_title, &block.text);
                subsection.body = Some(block);
                return;
            }
        }
        section.search_text = join_search_text(&section.plain_title, &block.text);
        section.intro = Some(block);
    }
}

fn render_title(title: &str) -> (String, String) {
    let html = render_inline(title);
    let plain = plain_text(&html).trim().to_string();
    (html, plain)
}

fn render_block(raw: String) -> Block {
    let html = render_markdown(&raw);
    let text = plain_text(&html);
    Block { raw, html, text }
}

fn join_search_text(title: &str, text: &str) -> String {
    format!("{title}\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_levels() {
        let content = "# 第一章 總則\n本章說明。\n\n## 第一條\n本法適用之。\n## 第二條\n第二條內容。\n# 第二章 罰則\n## 第三條\n罰則內容。\n";
        let doc = parse_document(content);

        assert_eq!(doc.sections.len(), 2);
        let first = &doc.sections[0];
        assert_eq!(first.id, "sec-1");
        assert_eq!(first.title, "第一章 總則");
        assert_eq!(first.intro.as_ref().map(|b| b.raw.as_str()), Some("本章說明。\n"));
        assert_eq!(first.subsections.len(), 2);
        assert_eq!(first.subsections[0].id, "sec-1-sub-1");
        assert_eq!(first.subsections[1].id, "sec-1-sub-2");
        assert_eq!(
            first.subsections[1].body.as_ref().map(|b| b.raw.as_str()),
            Some("第二條內容。")
        );

        let second = &doc.sections[1];
        assert_eq!(second.id, "sec-2");
        assert!(second.intro.is_none());
        assert_eq!(second.subsections.len(), 1);
        assert_eq!(second.subsections[0].id, "sec-2-sub-1");
    }

    #[test]
    fn section_and_subsection_counts_follow_headings() {
        let shape = [3usize, 0, 1, 4];
        let mut content = String::new();
        for (i, subs) in shape.iter().enumerate() {
            content.push_str(&format!("# 章{i}\n章{i}前言\n"));
            for j in 0..*subs {
                content.push_str(&format!("## 條{i}-{j}\n行一\n\n行三\n"));
            }
        }

        let doc = parse_document(&content);
        assert_eq!(doc.sections.len(), shape.len());
        for (i, (section, subs)) in doc.sections.iter().zip(shape).enumerate() {
            assert_eq!(section.title, format!("章{i}"));
            assert_eq!(section.subsections.len(), subs);
            for (j, sub) in section.subsections.iter().enumerate() {
                assert_eq!(sub.title, format!("條{i}-{j}"));
                assert_eq!(sub.body.as_ref().map(|b| b.raw.as_str()), Some("行一\n\n行三"));
            }
        }
    }

    #[test]
    fn subsection_before_section_gets_placeholder() {
        let doc = parse_document("## 前置\n內容\n# 第一章\n");
        assert_eq!(doc.sections.len(), 2);
        let placeholder = &doc.sections[0];
        assert_eq!(placeholder.id, "sec-1");
        assert!(placeholder.title.is_empty());
        assert_eq!(placeholder.subsections.len(), 1);
        assert_eq!(placeholder.subsections[0].id, "sec-1-sub-1");
        assert_eq!(doc.sections[1].id, "sec-2");
    }

    #[test]
    fn content_before_first_heading_is_dropped() {
        let doc = parse_document("序言\n\n# 第一章\n內容\n");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].intro.as_ref().map(|b| b.raw.as_str()), Some("內容"));
    }

    #[test]
    fn headings_with_no_content_have_no_blocks() {
        let doc = parse_document("# 甲\n## 乙\n## 丙\n");
        assert!(doc.sections[0].intro.is_none());
        assert!(doc.sections[0].subsections.iter().all(|s| s.body.is_none()));
        assert_eq!(doc.sections[0].search_text, "甲");
    }

    #[test]
    fn deeper_headings_are_content() {
        let doc = parse_document("# 甲\n### 細目\n內容\n");
        let intro = doc.sections[0].intro.as_ref().expect("intro");
        assert_eq!(intro.raw, "### 細目\n內容");
        assert!(intro.html.contains("<h3>細目</h3>"));
    }

    #[test]
    fn section_search_text_excludes_subsections() {
        let doc = parse_document("# 總則\n前言文字\n## 第一條\n條文文字\n");
        let section = &doc.sections[0];
        assert!(section.search_text.contains("總則"));
        assert!(section.search_text.contains("前言文字"));
        assert!(!section.search_text.contains("條文文字"));
        assert!(section.subsections[0].search_text.contains("第一條"));
        assert!(section.subsections[0].search_text.contains("條文文字"));
    }

    #[test]
    fn titles_are_stripped_of_markup() {
        let doc = parse_document(
            "# 附註\n## 一、總則 <a id=\"note-1\" class=\"footnote-anchor\"></a>\n說明\n",
        );
        let sub = &doc.sections[0].subsections[0];
        assert!(sub.title.contains("<a id=\"note-1\""));
        assert!(sub.title_html.contains("id=\"note-1\""));
        assert_eq!(sub.plain_title, "一、總則");
    }

    #[test]
    fn plain_text_never_contains_angle_brackets() {
        let doc = parse_document("# 甲 <b>x</b>\n1 < 2 > 0 `<code>`\n## 乙\n<div>區塊</div>\n");
        for section in &doc.sections {
            assert!(!section.plain_title.contains(['<', '>']));
            for block in section.intro.iter() {
                assert!(!block.text.contains(['<', '>']));
            }
            for sub in &section.subsections {
                assert!(!sub.plain_title.contains(['<', '>']));
                for block in sub.body.iter() {
                    assert!(!block.text.contains(['<', '>']));
                }
            }
        }
    }

    #[test]
    fn parse_bundled_document() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../static/md/laws.md");
        if !path.exists() {
            eprintln!("skipping parse_bundled_document: {} not found", path.display());
            return;
        }
        let content = std::fs::read_to_string(&path).expect("read bundled document");
        let text = crate::footnote::FootnoteRewriter::default().rewrite(&content);
        let doc = parse_document(&text);

        assert!(doc.sections.len() >= 3, "expected several chapters");
        let notes = doc
            .sections
            .iter()
            .find(|s| s.title == "附註")
            .expect("footnotes chapter");
        assert!(notes
            .subsections
            .iter()
            .any(|s| s.title_html.contains("id=\"note-1\"")));
    }
}
