// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("please specify only one of {0}")]
    ConflictingExpectations(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
