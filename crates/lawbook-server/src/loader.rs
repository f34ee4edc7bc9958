/// Document loading: fetch the source text, rewrite footnotes, parse.
///
/// A load either yields a complete `LoadedDocument` or fails; there is no
/// partial result, no retry and no request timeout.
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use lawbook_core::{build_document, Document, FootnoteRewriter};

use crate::config::{Config, Source};
use crate::error::AppError;

/// A parsed document together with where it came from.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: Document,
    /// Hex SHA-256 of the source text
    pub version: String,
    pub source: String,
}

pub struct Loader {
    source: Source,
    rewriter: FootnoteRewriter,
    http: reqwest::Client,
}

impl Loader {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lawbook-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            source: config.source.clone(),
            rewriter: FootnoteRewriter::new(config.footnote_heading.clone()),
            http,
        })
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub async fn fetch_source(&self) -> Result<String, AppError> {
        match &self.source {
            Source::Url(url) => {
                let resp = self.http.get(url).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(AppError::Status {
                        url: url.clone(),
                        status,
                    });
                }
                Ok(resp.text().await?)
            }
            Source::Path(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| AppError::Read {
                    path: path.clone(),
                    source,
                }),
        }
    }

    pub async fn load(&self) -> Result<LoadedDocument, AppError> {
        let text = self.fetch_source().await?;
        let version = fingerprint(&text);
        let document = build_document(&text, &self.rewriter);
        if document.is_empty() {
            warn!(source = %self.source, "document has no headings");
        }
        info!(
            source = %self.source,
            version = %version,
            bytes = text.len(),
            sections = document.sections.len(),
            subsections = document.subsection_count(),
            footnotes = self.rewriter.marker_heading(),
            "document loaded"
        );
        Ok(LoadedDocument {
            document,
            version,
            source: self.source.to_string(),
        })
    }
}

fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
