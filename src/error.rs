use std::path::PathBuf;

use thiserror::Error;

/// Page-level failures. Anything that only degrades one field is not an error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("description content not found in {0}")]
    NoDescription(String),
}

/// Failure to fetch one remote image. Never escalated past the image extractor.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("empty response body from {0}")]
    Empty(String),

    #[error("remote images disabled")]
    Disabled,
}
