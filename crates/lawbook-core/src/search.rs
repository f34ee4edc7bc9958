/// Keyword filtering over a parsed document.
///
/// Matching rules:
/// - A subsection is visible when the keyword occurs in its own search text or
///   in its parent section's search text. A hit in the chapter title or intro
///   therefore reveals the whole chapter.
/// - A section is visible when its own search text matches or any of its
///   subsections is visible.
///
/// The result is a `SearchView`: visibility plus the markup to show for every
/// element. The document itself is only read.
use serde::Serialize;

use crate::error::CoreError;
use crate::highlight::Highlighter;
use crate::model::{Document, Section, Subsection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchView {
    /// Trimmed keyword; empty when unfiltered
    pub keyword: String,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub separator_id: String,
    pub visible: bool,
    pub title_html: String,
    pub intro_html: Option<String>,
    pub subsections: Vec<SubsectionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsectionView {
    pub id: String,
    pub visible: bool,
    pub title_html: String,
    pub body_html: Option<String>,
}

impl SearchView {
    /// Everything visible, nothing highlighted.
    pub fn unfiltered(document: &Document) -> Self {
        Self {
            keyword: String::new(),
            sections: document
                .sections
                .iter()
                .map(|section| {
                    let subsections = section
                        .subsections
                        .iter()
                        .map(|sub| SubsectionView::build(sub, true, None))
                        .collect();
                    SectionView::build(section, true, None, subsections)
                })
                .collect(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        !self.keyword.is_empty()
    }

    pub fn section(&self, id: &str) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn subsection(&self, id: &str) -> Option<&SubsectionView> {
        self.sections
            .iter()
            .flat_map(|s| &s.subsections)
            .find(|s| s.id == id)
    }

    pub fn visible_sections(&self) -> usize {
        self.sections.iter().filter(|s| s.visible).count()
    }

    pub fn visible_subsections(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.subsections)
            .filter(|s| s.visible)
            .count()
    }
}

impl SectionView {
    fn build(
        section: &Section,
        visible: bool,
        highlighter: Option<&Highlighter>,
        subsections: Vec<SubsectionView>,
    ) -> Self {
        let mark = |html: &str| match highlighter {
            Some(h) => h.highlight(html),
            None => html.to_string(),
        };
        Self {
            id: section.id.clone(),
            separator_id: section.separator_id(),
            visible,
            title_html: mark(&section.title_html),
            intro_html: section.intro_html().map(mark),
            subsections,
        }
    }
}

impl SubsectionView {
    fn build(subsection: &Subsection, visible: bool, highlighter: Option<&Highlighter>) -> Self {
        let mark = |html: &str| match highlighter {
            Some(h) => h.highlight(html),
            None => html.to_string(),
        };
        Self {
            id: subsection.id.clone(),
            visible,
            title_html: mark(&subsection.title_html),
            body_html: subsection.body_html().map(mark),
        }
    }
}

/// Filter and highlight `document` by `keyword`.
///
/// The keyword is trimmed and compared case-insensitively. Only visible
/// elements are highlighted; hidden ones keep their plain markup.
pub fn search(document: &Document, keyword: &str) -> Result<SearchView, CoreError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(SearchView::unfiltered(document));
    }

    let needle = keyword.to_lowercase();
    let highlighter = Highlighter::new(keyword)?;

    let sections = document
        .sections
        .iter()
        .map(|section| {
            let section_match = contains(&section.search_text, &needle);
            let subsections: Vec<SubsectionView> = section
                .subsections
                .iter()
                .map(|sub| {
                    let visible = section_match || contains(&sub.search_text, &needle);
                    SubsectionView::build(sub, visible, visible.then_some(&highlighter))
                })
                .collect();
            let visible = section_match || subsections.iter().any(|s| s.visible);
            SectionView::build(
                section,
                visible,
                visible.then_some(&highlighter),
                subsections,
            )
        })
        .collect();

    Ok(SearchView {
        keyword: keyword.to_string(),
        sections,
    })
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    const DOC: &str = "# 第一章 總則\n本章規定適用範圍。\n## 第一條\n本法所稱主管機關。\n## 第二條\n罰鍰依第一條處理，罰鍰得加倍。\n# 第二章 附則\n## 第三條\n本法自公布日施行。\n## 第四條\n施行細則另定之。\n";

    #[test]
    fn empty_keyword_shows_everything_unhighlighted() {
        let doc = parse_document(DOC);
        let filtered = search(&doc, "罰鍰").expect("search");
        assert!(filtered.is_filtered());

        let view = search(&doc, "   ").expect("search");
        assert!(!view.is_filtered());
        assert_eq!(view, SearchView::unfiltered(&doc));
        assert_eq!(view.visible_sections(), 2);
        assert_eq!(view.visible_subsections(), 4);
        let json = serde_json::to_string(&view).expect("serialize");
        assert!(!json.contains("<mark>"));
    }

    #[test]
    fn intro_match_cascades_to_every_subsection() {
        let doc = parse_document(DOC);
        let view = search(&doc, "適用範圍").expect("search");
        let first = view.section("sec-1").expect("sec-1");
        assert!(first.visible);
        assert!(first.subsections.iter().all(|s| s.visible));
        assert!(first
            .intro_html
            .as_deref()
            .is_some_and(|h| h.contains("<mark>適用範圍</mark>")));
        assert!(!view.section("sec-2").expect("sec-2").visible);
    }

    #[test]
    fn subsection_match_hides_siblings() {
        let doc = parse_document(DOC);
        let view = search(&doc, "罰鍰").expect("search");

        let hit = view.subsection("sec-1-sub-2").expect("hit");
        assert!(hit.visible);
        let body = hit.body_html.as_deref().expect("body");
        assert_eq!(body.matches("<mark>罰鍰</mark>").count(), 2);

        let sibling = view.subsection("sec-1-sub-1").expect("sibling");
        assert!(!sibling.visible);
        assert!(!sibling.body_html.as_deref().unwrap_or_default().contains("<mark>"));

        assert!(view.section("sec-1").expect("sec-1").visible);
        assert!(!view.section("sec-2").expect("sec-2").visible);
        assert_eq!(view.visible_subsections(), 1);
    }

    #[test]
    fn section_title_match_reveals_chapter() {
        let doc = parse_document(DOC);
        let view = search(&doc, "附則").expect("search");
        let second = view.section("sec-2").expect("sec-2");
        assert!(second.visible);
        assert!(second.title_html.contains("<mark>附則</mark>"));
        assert!(second.subsections.iter().all(|s| s.visible));
        assert!(!view.section("sec-1").expect("sec-1").visible);
    }

    #[test]
    fn subsection_text_does_not_match_parent_directly() {
        let doc = parse_document("# 甲\n## 乙\n特定詞\n## 丙\n其他\n");
        let view = search(&doc, "特定詞").expect("search");
        let section = &view.sections[0];
        assert!(section.visible);
        assert!(section.subsections[0].visible);
        assert!(!section.subsections[1].visible);
    }

    #[test]
    fn keyword_is_case_insensitive_and_trimmed() {
        let doc = parse_document("# Chapter\n## Article\nThe COURT shall decide.\n");
        let view = search(&doc, "  court ").expect("search");
        assert_eq!(view.keyword, "court");
        let body = view.sections[0].subsections[0].body_html.as_deref().expect("body");
        assert!(body.contains("<mark>COURT</mark>"));
    }

    #[test]
    fn no_match_hides_everything() {
        let doc = parse_document(DOC);
        let view = search(&doc, "不存在的詞").expect("search");
        assert_eq!(view.visible_sections(), 0);
        assert_eq!(view.visible_subsections(), 0);
    }

    #[test]
    fn separator_follows_section_id() {
        let doc = parse_document(DOC);
        let view = search(&doc, "").expect("search");
        assert_eq!(view.sections[1].separator_id, "sec-2-separator");
    }
}
