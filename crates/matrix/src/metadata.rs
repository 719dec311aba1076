// metadata.json model (only the fields the matrix needs)

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub operatingsystem_support: Vec<OsSupport>,
    #[serde(default)]
    pub requirements: Option<Vec<Requirement>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsSupport {
    pub operatingsystem: String,
    #[serde(default)]
    pub operatingsystemrelease: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version_requirement: Option<String>,
}

impl Metadata {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
