/// The HTML shell around the rendered containers.
///
/// The page carries the search field and a small script: every input event
/// asks `/api/search` for a fresh view and applies visibility and markup to
/// the elements already in the page. Scrolling to the URL fragment runs once
/// the content is in the document.
use lawbook_core::html::{escape_attribute, escape_text};
use lawbook_core::Containers;

pub const LOAD_FAILED_MESSAGE: &str = "法律條文載入失敗";
pub const TOC_CONTAINER_ID: &str = "laws-toc";
pub const CONTENT_CONTAINER_ID: &str = "laws-text-container";
pub const SEARCH_INPUT_ID: &str = "law-search";

pub enum PageBody<'a> {
    Rendered {
        containers: &'a Containers,
        version: &'a str,
    },
    LoadFailed,
}

pub fn render_page(title: &str, keyword: &str, body: PageBody<'_>) -> String {
    let (toc, content, version) = match body {
        PageBody::Rendered {
            containers,
            version,
        } => (
            containers.toc.as_str(),
            containers.content.clone(),
            version,
        ),
        PageBody::LoadFailed => (
            "",
            format!("<p class=\"load-error\">{LOAD_FAILED_MESSAGE}</p>\n"),
            "",
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-Hant">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{title}</title>
    <style>{STYLE}</style>
  </head>
  <body>
    <header>
      <h1>{title}</h1>
      <input id="{SEARCH_INPUT_ID}" type="search" placeholder="搜尋條文" value="{keyword}" autocomplete="off" />
    </header>
    <main>
      <nav id="{TOC_CONTAINER_ID}">
{toc}      </nav>
      <div id="{CONTENT_CONTAINER_ID}" data-version="{version}">
{content}      </div>
    </main>
    <script data-input="{SEARCH_INPUT_ID}" data-toc="{TOC_CONTAINER_ID}" data-content="{CONTENT_CONTAINER_ID}">{SCRIPT}</script>
  </body>
</html>
"#,
        title = escape_text(title),
        keyword = escape_attribute(keyword),
        version = escape_attribute(version),
    )
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; }
header { padding: 1rem; border-bottom: 1px solid #ddd; }
main { display: flex; }
nav { width: 18rem; padding: 1rem; overflow-y: auto; max-height: calc(100vh - 6rem); }
nav ul { list-style: none; padding: 0; }
nav .toc-subsection { padding-left: 1rem; }
main > div { flex: 1; padding: 1rem; }
.load-error { color: red; }
mark { background: #ffe066; }
[hidden] { display: none !important; }
"#;

const SCRIPT: &str = r#"
(function () {
  var ids = document.currentScript.dataset;
  var input = document.getElementById(ids.input);
  var container = document.getElementById(ids.content);
  var toc = document.getElementById(ids.toc);
  var latest = 0;

  function show(el, visible) {
    if (el) el.hidden = !visible;
  }

  function setMarkup(el, selector, html) {
    if (!el || html === null || html === undefined) return;
    var target = el.querySelector(selector);
    if (target) target.innerHTML = html;
  }

  function navEntry(id) {
    return toc && toc.querySelector('[data-target="' + id + '"]');
  }

  function apply(view) {
    view.sections.forEach(function (section) {
      var el = document.getElementById(section.id);
      show(el, section.visible);
      show(navEntry(section.id), section.visible);
      show(document.getElementById(section.separator_id), section.visible);
      setMarkup(el, ":scope > .law-title", section.title_html);
      setMarkup(el, ":scope > .law-body", section.intro_html);
      section.subsections.forEach(function (sub) {
        var subEl = document.getElementById(sub.id);
        show(subEl, sub.visible);
        show(navEntry(sub.id), sub.visible);
        setMarkup(subEl, ":scope > .law-title", sub.title_html);
        setMarkup(subEl, ":scope > .law-body", sub.body_html);
      });
    });
  }

  if (input && container && container.dataset.version) {
    input.addEventListener("input", function () {
      var ticket = ++latest;
      fetch("/api/search?q=" + encodeURIComponent(input.value))
        .then(function (res) {
          if (!res.ok) throw new Error("search failed: " + res.status);
          return res.json();
        })
        .then(function (body) {
          if (ticket !== latest) return;
          if (body.version !== container.dataset.version) {
            console.warn("document changed since page load");
          }
          apply(body.view);
        })
        .catch(function (err) {
          console.error(err);
        });
    });
  }

  function scrollToFragment() {
    if (!location.hash) return;
    var el = document.getElementById(decodeURIComponent(location.hash.slice(1)));
    if (el) el.scrollIntoView();
  }

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", scrollToFragment);
  } else {
    scrollToFragment();
  }
})();
"#;
