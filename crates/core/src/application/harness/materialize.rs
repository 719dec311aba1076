// Materialize content as files the engine can reach

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Harness;
use crate::domain::{single_record, ExecutionContext, Inventory, Target};
use crate::error::{AppError, Result};

/// Remote directory manifests are uploaded into
pub const REMOTE_TEMP_DIR: &str = "/tmp";

/// Where a manifest lives for the target, plus the local temp copy to discard
pub(super) struct MaterializedManifest {
    pub target_path: String,
    pub local_temp: Option<PathBuf>,
}

impl MaterializedManifest {
    /// An existing manifest on the target; nothing to clean up
    pub fn existing(location: &str) -> Self {
        Self {
            target_path: location.to_string(),
            local_temp: None,
        }
    }

    /// Remove the local temp copy, if any
    pub async fn discard(self) {
        if let Some(path) = self.local_temp {
            remove_temp_file(&path).await;
        }
    }
}

async fn remove_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "Could not remove temp file");
    }
}

impl Harness {
    /// `<prefix>_<YYYYMMDD>_<pid>_<token><extension>`
    fn temp_file_name(&self, prefix: &str, extension: &str) -> String {
        format!(
            "{}_{}_{}_{}{}",
            prefix,
            self.time_provider.date_stamp(),
            std::process::id(),
            self.id_provider.generate_id(),
            extension
        )
    }

    /// Write a manifest body to a temp file and resolve the path the target sees
    ///
    /// The local copy stays until the caller discards it. The uploaded copy
    /// on a remote target is left in place.
    pub(super) async fn materialize_manifest(
        &self,
        ctx: &ExecutionContext,
        inventory: Option<&Inventory>,
        manifest: &str,
    ) -> Result<MaterializedManifest> {
        let file_name = self.temp_file_name("manifest", ".pp");
        let local_path = ctx.temp_dir.join(&file_name);
        tokio::fs::write(&local_path, manifest).await?;

        debug!(path = %local_path.display(), bytes = manifest.len(), "Wrote manifest");

        let target_path = match &ctx.target {
            Target::Local => local_path.display().to_string(),
            Target::Remote(_) => {
                let remote_path = format!("{}/{}", REMOTE_TEMP_DIR, file_name);
                if let Err(e) = self
                    .push_file(ctx, inventory, &local_path, &remote_path)
                    .await
                {
                    remove_temp_file(&local_path).await;
                    return Err(e);
                }
                remote_path
            }
        };

        Ok(MaterializedManifest {
            target_path,
            local_temp: Some(local_path),
        })
    }

    /// Write `content` to `destination` on the target
    pub async fn write_file(
        &self,
        ctx: &ExecutionContext,
        content: &str,
        destination: &str,
    ) -> Result<()> {
        let inventory = self.resolve_inventory(ctx).await?;
        let local_path = ctx.temp_dir.join(self.temp_file_name("file", ""));
        tokio::fs::write(&local_path, content).await?;

        let outcome = match &ctx.target {
            Target::Local => tokio::fs::copy(&local_path, destination)
                .await
                .map(|_| ())
                .map_err(AppError::from),
            Target::Remote(_) => {
                self.push_file(ctx, inventory.as_ref(), &local_path, destination)
                    .await
            }
        };

        remove_temp_file(&local_path).await;

        outcome?;
        info!(host = %ctx.target, destination = %destination, "File written");
        Ok(())
    }

    async fn push_file(
        &self,
        ctx: &ExecutionContext,
        inventory: Option<&Inventory>,
        local_path: &Path,
        destination: &str,
    ) -> Result<()> {
        let records = self
            .engine
            .upload_file(local_path, destination, ctx.target.name(), inventory)
            .await?;
        let record = single_record(records)?;

        if !record.is_success() {
            return Err(AppError::UploadFailed {
                source_path: local_path.display().to_string(),
                destination: destination.to_string(),
                output: record.render(),
            });
        }
        Ok(())
    }
}
