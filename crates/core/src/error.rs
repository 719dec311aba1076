// Central Error Type for the Harness

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// Mutually exclusive or missing arguments. Never retried.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The engine reported a failure the caller did not expect.
    #[error(
        "{operation} failed\n`{invocation}`\n======Start output of failed run======\n{output}\n======End output of failed run======"
    )]
    ExecutionFailed {
        operation: String,
        invocation: String,
        output: String,
    },

    #[error("Upload of {source_path} to {destination} failed: {output}")]
    UploadFailed {
        source_path: String,
        destination: String,
        output: String,
    },

    #[error("Target '{target}' not found in inventory {inventory}")]
    UnknownTarget { target: String, inventory: String },

    #[error("Engine returned no result records")]
    EmptyResponse,

    #[error("Engine returned {0} result records, expected exactly one target")]
    MultipleTargets(usize),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] crate::port::EngineError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// True for errors raised before the engine was ever called
    pub fn is_usage(&self) -> bool {
        matches!(self, AppError::Usage(_) | AppError::UnknownTarget { .. })
    }
}
