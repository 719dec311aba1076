// Inventory Loader Port

use async_trait::async_trait;
use std::path::Path;

use crate::domain::Inventory;
use crate::error::Result;

/// Loads inventory data describing how to reach named targets
#[async_trait]
pub trait InventoryLoader: Send + Sync {
    /// Load the inventory at `path`
    ///
    /// # Errors
    /// - AppError::Inventory if the file is missing or malformed
    async fn load(&self, path: &Path) -> Result<Inventory>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns the same inventory on every load, counting loads
    pub struct StaticInventoryLoader {
        data: serde_json::Value,
        loads: Arc<AtomicUsize>,
    }

    impl StaticInventoryLoader {
        pub fn new(data: serde_json::Value) -> Self {
            Self {
                data,
                loads: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Inventory with one group holding the given targets
        pub fn with_targets(targets: &[&str]) -> Self {
            Self::new(serde_json::json!({
                "version": 2,
                "groups": [{"name": "ssh_nodes", "targets": targets}]
            }))
        }

        pub fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InventoryLoader for StaticInventoryLoader {
        async fn load(&self, path: &Path) -> Result<Inventory> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Inventory::new(path, self.data.clone()))
        }
    }
}
