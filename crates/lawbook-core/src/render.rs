/// Page rendering: the navigation list and the content view.
///
/// Both are written into `Containers`, replacing whatever a previous render
/// left there. Every content element carries its model id so it can be used
/// as a fragment target, and every navigation entry carries the id of the
/// element it points to in `data-target`.
use crate::html::{escape_attribute, escape_text};
use crate::model::Document;
use crate::search::SearchView;

/// The two page slots the renderer owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Containers {
    pub toc: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    /// Render `document` as seen through `view` into `containers`.
    pub fn render(&self, document: &Document, view: &SearchView, containers: &mut Containers) {
        containers.toc = self.render_toc(document, view);
        containers.content = self.render_content(view);
    }

    /// One entry per section, each followed by the entries of its
    /// subsections. Entries share the visibility of their target.
    pub fn render_toc(&self, document: &Document, view: &SearchView) -> String {
        let mut out = String::from("<ul class=\"law-toc\">\n");
        for (section, section_view) in document.sections.iter().zip(&view.sections) {
            out.push_str(&toc_entry(
                "toc-section",
                &section.id,
                &section.plain_title,
                section_view.visible,
            ));
            for (sub, sub_view) in section.subsections.iter().zip(&section_view.subsections) {
                out.push_str(&toc_entry(
                    "toc-subsection",
                    &sub.id,
                    &sub.plain_title,
                    sub_view.visible,
                ));
            }
        }
        out.push_str("</ul>\n");
        out
    }

    pub fn render_content(&self, view: &SearchView) -> String {
        let mut out = String::new();
        for section in &view.sections {
            out.push_str(&format!(
                "<section id=\"{}\" class=\"law-section\"{}>\n",
                escape_attribute(&section.id),
                hidden_attr(section.visible)
            ));
            if !section.title_html.is_empty() {
                out.push_str(&format!(
                    "<h2 class=\"law-title\">{}</h2>\n",
                    section.title_html
                ));
            }
            if let Some(intro) = &section.intro_html {
                out.push_str(&format!("<div class=\"law-body\">{intro}</div>\n"));
            }
            for sub in &section.subsections {
                out.push_str(&format!(
                    "<article id=\"{}\" class=\"law-subsection\"{}>\n<h3 class=\"law-title\">{}</h3>\n",
                    escape_attribute(&sub.id),
                    hidden_attr(sub.visible),
                    sub.title_html
                ));
                if let Some(body) = &sub.body_html {
                    out.push_str(&format!("<div class=\"law-body\">{body}</div>\n"));
                }
                out.push_str("</article>\n");
            }
            out.push_str("</section>\n");
            out.push_str(&format!(
                "<hr id=\"{}\" class=\"law-separator\"{}>\n",
                escape_attribute(&section.separator_id),
                hidden_attr(section.visible)
            ));
        }
        out
    }
}

fn toc_entry(class: &str, id: &str, label: &str, visible: bool) -> String {
    let id = escape_attribute(id);
    format!(
        "<li class=\"{class}\" data-target=\"{id}\"{}><a href=\"#{id}\">{}</a></li>\n",
        hidden_attr(visible),
        escape_text(label)
    )
}

fn hidden_attr(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " hidden"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use crate::search::search;

    const DOC: &str = "# 第一章 總則\n前言\n## 第一條\n甲條文\n## 第二條\n乙條文\n# 第二章\n## 第三條\n丙條文\n";

    #[test]
    fn toc_lists_sections_then_their_subsections() {
        let doc = parse_document(DOC);
        let view = SearchView::unfiltered(&doc);
        let toc = Renderer.render_toc(&doc, &view);
        let targets: Vec<&str> = toc
            .lines()
            .filter_map(|line| line.split("data-target=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert_eq!(
            targets,
            ["sec-1", "sec-1-sub-1", "sec-1-sub-2", "sec-2", "sec-2-sub-1"]
        );
        assert!(toc.contains("<a href=\"#sec-1\">第一章 總則</a>"));
        assert!(!toc.contains("hidden"));
    }

    #[test]
    fn content_nests_subsections_inside_sections() {
        let doc = parse_document(DOC);
        let content = Renderer.render_content(&SearchView::unfiltered(&doc));
        let sec1 = content.find("id=\"sec-1\"").expect("sec-1");
        let sub = content.find("id=\"sec-1-sub-1\"").expect("sub");
        let sep = content.find("id=\"sec-1-separator\"").expect("separator");
        let sec2 = content.find("id=\"sec-2\"").expect("sec-2");
        assert!(sec1 < sub && sub < sep && sep < sec2);
        assert!(content.contains("<div class=\"law-body\"><p>前言</p>\n</div>"));
        assert!(content.contains("<h3 class=\"law-title\">第一條</h3>"));
    }

    #[test]
    fn rendering_twice_replaces_output() {
        let doc = parse_document(DOC);
        let view = SearchView::unfiltered(&doc);
        let mut once = Containers::default();
        Renderer.render(&doc, &view, &mut once);

        let mut twice = Containers::default();
        Renderer.render(&doc, &view, &mut twice);
        Renderer.render(&doc, &view, &mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn hidden_elements_and_their_entries_are_hidden_together() {
        let doc = parse_document(DOC);
        let view = search(&doc, "丙條文").expect("search");
        let mut containers = Containers::default();
        Renderer.render(&doc, &view, &mut containers);

        assert!(containers
            .toc
            .contains("<li class=\"toc-section\" data-target=\"sec-1\" hidden>"));
        assert!(containers
            .toc
            .contains("<li class=\"toc-subsection\" data-target=\"sec-2-sub-1\">"));
        assert!(containers
            .content
            .contains("<section id=\"sec-1\" class=\"law-section\" hidden>"));
        assert!(containers
            .content
            .contains("<hr id=\"sec-1-separator\" class=\"law-separator\" hidden>"));
        assert!(containers.content.contains("<mark>丙條文</mark>"));
    }

    #[test]
    fn placeholder_section_has_no_heading() {
        let doc = parse_document("## 孤立\n內容\n");
        let content = Renderer.render_content(&SearchView::unfiltered(&doc));
        assert!(!content.contains("<h2"));
        assert!(content.contains("<h3 class=\"law-title\">孤立</h3>"));
    }

    #[test]
    fn labels_are_escaped() {
        let doc = parse_document("# A &amp; B\n");
        let toc = Renderer.render_toc(&doc, &SearchView::unfiltered(&doc));
        assert!(toc.contains(">A &amp; B</a>"));
    }
}
