use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unable to download versions.json after {attempts} attempts: {source}")]
    Unavailable {
        attempts: u32,
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether repeating the request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(e) => !e.is_builder(),
            FetchError::Status { .. } => true,
            FetchError::InvalidResponse(_) => false,
            FetchError::Unavailable { .. } => false,
        }
    }
}

/// Batch-level failures. The message of each variant is shown to the user as is.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid version range found in Julia compat: {0}")]
    InvalidCompatRange(String),

    #[error("Unable to locate Julia project file with project: {}", .0.display())]
    ProjectFileNotFound(PathBuf),

    #[error("Unable to locate Julia manifest file with project: {}", .0.display())]
    ManifestFileNotFound(PathBuf),

    #[error(
        "Unable to use version \"min\" when the Julia project file does not specify a compat for Julia"
    )]
    MissingCompatRange,

    #[error("No Julia version exists matching specifier: \"{0}\"")]
    NoMatchingVersion(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
