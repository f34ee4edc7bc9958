use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch failed: {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] lawbook_core::CoreError),
}
