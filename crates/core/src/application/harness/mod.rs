// Harness Service - the operations acceptance tests call
//
// Every operation resolves the target first: local targets run without
// inventory, remote targets load it and must be declared in it.

pub mod apply;
mod materialize;
mod report;
mod run;


pub use apply::build_apply_command;
pub use materialize::REMOTE_TEMP_DIR;
pub use report::write_apply_diagnostics;

use std::sync::Arc;
use tracing::debug;

use crate::domain::{ExecutionContext, Inventory, Target};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, InventoryLoader, OrchestrationEngine, TimeProvider};

/// Harness Service
pub struct Harness {
    engine: Arc<dyn OrchestrationEngine>,
    inventory_loader: Arc<dyn InventoryLoader>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
}

impl Harness {
    pub fn new(
        engine: Arc<dyn OrchestrationEngine>,
        inventory_loader: Arc<dyn InventoryLoader>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            engine,
            inventory_loader,
            time_provider,
            id_provider,
        }
    }

    /// Load inventory for remote targets; local targets need none
    async fn resolve_inventory(&self, ctx: &ExecutionContext) -> Result<Option<Inventory>> {
        let name = match &ctx.target {
            Target::Local => return Ok(None),
            Target::Remote(name) => name,
        };

        let inventory = self.inventory_loader.load(&ctx.inventory_path).await?;
        if !inventory.contains_target(name) {
            return Err(AppError::UnknownTarget {
                target: name.clone(),
                inventory: ctx.inventory_path.display().to_string(),
            });
        }

        debug!(
            host = %name,
            inventory = %ctx.inventory_path.display(),
            "Resolved remote target"
        );
        Ok(Some(inventory))
    }
}
