// Matrix generator errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Unrecognized version requirement '{0}'")]
    UnrecognizedRequirement(String),

    #[error("Invalid version in requirement '{requirement}': {source}")]
    InvalidVersion {
        requirement: String,
        source: semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, MatrixError>;
