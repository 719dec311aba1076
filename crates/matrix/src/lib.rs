//! Build matrix generation from declared platform support
//!
//! Reads `metadata.json`, maps each claimed operating system release to a
//! test image and each puppet version requirement to release collections.

pub mod error;
pub mod matrix;
pub mod metadata;
pub mod output;
pub mod requirement;
pub mod tables;

pub use error::{MatrixError, Result};
pub use matrix::{generate, Matrix, MatrixReport};
pub use metadata::Metadata;
pub use output::{write_github_output, Annotation};
pub use requirement::VersionRequirement;
