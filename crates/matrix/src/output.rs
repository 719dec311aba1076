// Workflow commands and step outputs
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// A message rendered as a workflow command (`::warning::...`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Notice(String),
    Warning(String),
    Error(String),
}

impl Annotation {
    pub fn level(&self) -> &'static str {
        match self {
            Self::Notice(_) => "notice",
            Self::Warning(_) => "warning",
            Self::Error(_) => "error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Notice(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{}::{}", self.level(), self.message())
    }
}

/// Append `name=value` to the step output file, creating it if needed
pub fn write_github_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}={}", name, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_annotation_rendering() {
        assert_eq!(
            Annotation::Notice("Expecting CentOS-7 test using docker".to_string()).to_string(),
            "::notice::Expecting CentOS-7 test using docker"
        );
        assert_eq!(
            Annotation::Warning("Cannot find image for Solaris-11".to_string()).to_string(),
            "::warning::Cannot find image for Solaris-11"
        );
        assert_eq!(Annotation::Error("boom".to_string()).to_string(), "::error::boom");
    }

    #[test]
    fn test_output_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "previous=1\n").unwrap();

        write_github_output(&path, "matrix", r#"{"platform":[],"collection":[]}"#).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "previous=1\nmatrix={\"platform\":[],\"collection\":[]}\n"
        );
    }
}
