use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeaderboardError>;

/// Failures of the collaborators the engine talks to.
///
/// User mistakes (bad names, unparsable distances, malformed snapshots) are not
/// errors at this level; they become reply text.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Text extraction error: {0}")]
    ExtractionError(String),
}
