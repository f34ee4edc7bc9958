use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use lawbook_core::footnote::DEFAULT_MARKER_HEADING;

use crate::error::AppError;

const DEFAULT_SOURCE: &str = "static/md/laws.md";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_PAGE_TITLE: &str = "法律條文";

/// Where the law document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` values are URLs, everything else is a path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Source::Url(value.to_string())
        } else {
            Source::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL or filesystem path of the Markdown document.
    pub source: Source,
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Heading line that opens the footnotes chapter.
    pub footnote_heading: String,
    /// Used for the page `<title>` and header.
    pub page_title: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `LAWBOOK_SOURCE`: document URL or path (default: "static/md/laws.md")
    /// - `LAWBOOK_LISTEN_ADDR`: bind address (default: "127.0.0.1:8080")
    /// - `LAWBOOK_FOOTNOTE_HEADING`: footnotes chapter heading (default: "# 附註")
    /// - `LAWBOOK_PAGE_TITLE`: page title (default: "法律條文")
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let source = lookup("LAWBOOK_SOURCE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        let listen_addr = lookup("LAWBOOK_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr.parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("LAWBOOK_LISTEN_ADDR is not a socket address ({listen_addr}): {e}"))
        })?;

        let footnote_heading = lookup("LAWBOOK_FOOTNOTE_HEADING")
            .unwrap_or_else(|| DEFAULT_MARKER_HEADING.to_string());
        if !footnote_heading.starts_with('#') {
            return Err(AppError::Config(format!(
                "LAWBOOK_FOOTNOTE_HEADING must be a Markdown heading, got {footnote_heading:?}"
            )));
        }

        let page_title =
            lookup("LAWBOOK_PAGE_TITLE").unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string());

        Ok(Self {
            source: Source::parse(&source),
            listen_addr,
            footnote_heading,
            page_title,
        })
    }
}
