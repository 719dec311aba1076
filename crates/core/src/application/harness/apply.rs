// Apply Manifest Use Case

use std::path::Path;
use tracing::{debug, info};

use super::materialize::MaterializedManifest;
use super::report::{execution_failed, print_apply_diagnostics};
use super::Harness;
use crate::domain::{
    single_record, ApplyExpectation, ApplyOptions, CommandResult, ExecutionContext, Inventory,
};
use crate::error::{AppError, Result};

/// Command the engine runs on the target
pub const APPLY_COMMAND: &str = "puppet apply";

/// Build the apply invocation
///
/// Flag order is fixed; each flag is present only when its option is set.
/// `local_modulepath` is passed only for local targets. Paths are single
/// quoted for the target shell.
pub fn build_apply_command(
    manifest_path: &str,
    local_modulepath: Option<&Path>,
    opts: &ApplyOptions,
    expectation: ApplyExpectation,
) -> String {
    let manifest_path = shell_quote(manifest_path);
    let mut command = match opts.prefix_command.as_deref().map(str::trim) {
        Some(prefix) if !prefix.is_empty() => format!("{} {} {}", prefix, APPLY_COMMAND, manifest_path),
        _ => format!("{} {}", APPLY_COMMAND, manifest_path),
    };

    if opts.trace_logs {
        command.push_str(" --trace");
    }
    if let Some(modulepath) = local_modulepath {
        let modulepath = modulepath.display().to_string();
        command.push_str(&format!(" --modulepath {}", shell_quote(&modulepath)));
    }
    if let Some(hiera_config) = &opts.hiera_config {
        command.push_str(&format!(" --hiera_config={}", shell_quote(hiera_config)));
    }
    if expectation.uses_detailed_exit_codes() {
        command.push_str(" --detailed-exitcodes");
    }
    if opts.debug {
        command.push_str(" --debug");
    }
    if opts.noop {
        command.push_str(" --noop");
    }

    command
}

/// POSIX single quoting: `it's` becomes `'it'\''s'`
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

fn validate_manifest_args(manifest: Option<&str>, opts: &ApplyOptions) -> Result<ApplyExpectation> {
    if manifest.is_some() && opts.manifest_file_location.is_some() {
        return Err(AppError::Usage(
            "manifest and manifest_file_location are mutually exclusive arguments, pick one"
                .to_string(),
        ));
    }
    if manifest.map_or(true, str::is_empty) && opts.manifest_file_location.is_none() {
        return Err(AppError::Usage(
            "please pass a manifest or the manifest_file_location".to_string(),
        ));
    }

    opts.expectation()
        .map_err(|e| AppError::Usage(e.to_string()))
}

impl Harness {
    /// Apply a manifest body (or an existing manifest file) to the target
    pub async fn apply_manifest(
        &self,
        ctx: &ExecutionContext,
        manifest: Option<&str>,
        opts: &ApplyOptions,
    ) -> Result<CommandResult> {
        self.apply_manifest_with(ctx, manifest, opts, |_| {}).await
    }

    /// Apply a manifest, then hand the result to `check` before returning it
    pub async fn apply_manifest_with<F>(
        &self,
        ctx: &ExecutionContext,
        manifest: Option<&str>,
        opts: &ApplyOptions,
        check: F,
    ) -> Result<CommandResult>
    where
        F: FnOnce(&CommandResult) + Send,
    {
        let expectation = validate_manifest_args(manifest, opts)?;
        let inventory = self.resolve_inventory(ctx).await?;
        let location = self
            .manifest_location(ctx, inventory.as_ref(), manifest, opts)
            .await?;

        let result = self
            .run_apply(
                ctx,
                inventory.as_ref(),
                &location.target_path,
                opts,
                expectation,
                check,
            )
            .await;
        location.discard().await;
        result
    }

    /// Apply twice: the first run must not fail, the second must change nothing
    ///
    /// Returns the result of the second run.
    pub async fn idempotent_apply(
        &self,
        ctx: &ExecutionContext,
        manifest: Option<&str>,
        opts: &ApplyOptions,
    ) -> Result<CommandResult> {
        validate_manifest_args(manifest, &opts.without_expectations())?;
        let inventory = self.resolve_inventory(ctx).await?;
        let location = self
            .manifest_location(ctx, inventory.as_ref(), manifest, opts)
            .await?;

        let result = self
            .apply_twice(ctx, inventory.as_ref(), &location.target_path, opts)
            .await;
        location.discard().await;
        result
    }

    async fn apply_twice(
        &self,
        ctx: &ExecutionContext,
        inventory: Option<&Inventory>,
        path: &str,
        opts: &ApplyOptions,
    ) -> Result<CommandResult> {
        let converge = ApplyOptions {
            catch_failures: true,
            ..opts.without_expectations()
        };
        self.run_apply(
            ctx,
            inventory,
            path,
            &converge,
            ApplyExpectation::CatchFailures,
            |_| {},
        )
        .await?;

        let recheck = ApplyOptions {
            catch_changes: true,
            ..opts.without_expectations()
        };
        let result = self
            .run_apply(
                ctx,
                inventory,
                path,
                &recheck,
                ApplyExpectation::CatchChanges,
                |_| {},
            )
            .await?;

        info!(host = %ctx.target, manifest = %path, "Manifest is idempotent");
        Ok(result)
    }

    async fn manifest_location(
        &self,
        ctx: &ExecutionContext,
        inventory: Option<&Inventory>,
        manifest: Option<&str>,
        opts: &ApplyOptions,
    ) -> Result<MaterializedManifest> {
        match &opts.manifest_file_location {
            Some(location) => Ok(MaterializedManifest::existing(location)),
            None => {
                self.materialize_manifest(ctx, inventory, manifest.unwrap_or_default())
                    .await
            }
        }
    }

    async fn run_apply<F>(
        &self,
        ctx: &ExecutionContext,
        inventory: Option<&Inventory>,
        manifest_path: &str,
        opts: &ApplyOptions,
        expectation: ApplyExpectation,
        check: F,
    ) -> Result<CommandResult>
    where
        F: FnOnce(&CommandResult) + Send,
    {
        let modulepath = ctx.target.is_local().then_some(ctx.modulepath.as_path());
        let command = build_apply_command(manifest_path, modulepath, opts, expectation);

        debug!(host = %ctx.target, command = %command, "Applying manifest");

        let records = self
            .engine
            .run_command(&command, ctx.target.name(), inventory)
            .await?;
        let record = single_record(records)?;
        let result = CommandResult::from_command(&record);

        if !expectation.accepts(result.exit_code) {
            let operation = match expectation {
                ApplyExpectation::CatchChanges => "apply manifest (changes detected)",
                ApplyExpectation::ExpectChanges => "apply manifest (no changes detected)",
                _ => "apply manifest",
            };
            return Err(execution_failed(operation, &command, &record));
        }

        check(&result);

        if ctx.debug {
            print_apply_diagnostics(&command, &result);
        }

        Ok(result)
    }
}
