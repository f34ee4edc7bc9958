/// Footnote cross-references.
///
/// Inline references look like `（註1）` or `(註１２)` and may mix full-width
/// and half-width parentheses and digits. Definitions live under a fixed
/// footnotes chapter, one `## 一、...` heading per note. Both are rewritten
/// into plain HTML anchors before the structural parse, so the rest of the
/// pipeline treats them as ordinary inline markup.
use regex::{Captures, Regex};

/// Heading that opens the footnotes chapter unless configured otherwise.
pub const DEFAULT_MARKER_HEADING: &str = "# 附註";

const NUMERALS: [(char, u8); 10] = [
    ('一', 1),
    ('二', 2),
    ('三', 3),
    ('四', 4),
    ('五', 5),
    ('六', 6),
    ('七', 7),
    ('八', 8),
    ('九', 9),
    ('十', 10),
];

pub struct FootnoteRewriter {
    marker_heading: String,
    reference_re: Regex,
    definition_re: Regex,
}

impl Default for FootnoteRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_HEADING)
    }
}

impl FootnoteRewriter {
    pub fn new(marker_heading: impl Into<String>) -> Self {
        Self {
            marker_heading: marker_heading.into().trim_end().to_string(),
            reference_re: Regex::new(r"[（(]註([0-9０-９]+)[）)]").expect("valid regex"),
            definition_re: Regex::new(r"^##[ \t]+([一二三四五六七八九十]+)、")
                .expect("valid regex"),
        }
    }

    pub fn marker_heading(&self) -> &str {
        &self.marker_heading
    }

    /// Apply both rewrites. The output has the same number of lines as the
    /// input and only touches reference tokens and note headings.
    pub fn rewrite(&self, text: &str) -> String {
        let text = self.link_references(text);
        self.anchor_definitions(&text)
    }

    /// Wrap every inline reference in a link to `#note-<n>`. The visible
    /// reference text is kept exactly as written.
    pub fn link_references(&self, text: &str) -> String {
        self.reference_re
            .replace_all(text, |caps: &Captures| {
                format!(
                    r##"<a href="#note-{}" class="footnote-ref">{}</a>"##,
                    ascii_digits(&caps[1]),
                    &caps[0]
                )
            })
            .into_owned()
    }

    /// Append a `note-<n>` anchor to each numbered heading that follows the
    /// marker heading. Without a marker heading nothing changes.
    pub fn anchor_definitions(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut in_notes = false;

        for line in text.split_inclusive('\n') {
            let (content, ending) = split_line_ending(line);
            if in_notes {
                if let Some(number) = self.definition_number(content) {
                    out.push_str(content);
                    out.push_str(&format!(
                        r#" <a id="note-{number}" class="footnote-anchor"></a>"#
                    ));
                    out.push_str(ending);
                    continue;
                }
            } else if content.trim_end() == self.marker_heading {
                in_notes = true;
            }
            out.push_str(line);
        }

        out
    }

    fn definition_number(&self, line: &str) -> Option<u8> {
        let caps = self.definition_re.captures(line)?;
        numeral_value(&caps[1])
    }
}

/// Value of a single Chinese numeral from 一 to 十. Longer runs such as
/// 十一 are outside the table.
fn numeral_value(run: &str) -> Option<u8> {
    let mut chars = run.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    NUMERALS
        .iter()
        .find(|(numeral, _)| *numeral == ch)
        .map(|(_, value)| *value)
}

fn ascii_digits(digits: &str) -> String {
    digits
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            _ => c,
        })
        .collect()
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}
