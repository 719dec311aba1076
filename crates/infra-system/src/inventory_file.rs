// YAML inventory loader
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use litmus_core::domain::Inventory;
use litmus_core::error::{AppError, Result};
use litmus_core::port::InventoryLoader;

/// Reads a Bolt inventory file (`spec/fixtures/litmus_inventory.yaml`)
#[derive(Debug, Default, Clone)]
pub struct YamlInventoryLoader;

impl YamlInventoryLoader {
    pub fn new() -> Self {
        Self
    }

    /// Expand `~` and environment references in a configured path
    fn expand(path: &Path) -> PathBuf {
        let raw = path.to_string_lossy();
        match shellexpand::full(&raw) {
            Ok(expanded) => PathBuf::from(expanded.into_owned()),
            Err(_) => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl InventoryLoader for YamlInventoryLoader {
    async fn load(&self, path: &Path) -> Result<Inventory> {
        let path = Self::expand(path);

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::Inventory(format!("cannot read {}: {}", path.display(), e))
        })?;

        let data: serde_json::Value = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Inventory(format!("cannot parse {}: {}", path.display(), e))
        })?;

        if !data.is_object() {
            return Err(AppError::Inventory(format!(
                "{} is not a mapping",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Loaded inventory");
        Ok(Inventory::new(path, data))
    }
}
