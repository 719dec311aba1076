// Shell, script, upload and task use cases
// Rule for all four: raise unless the caller expects failures

use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use super::report::execution_failed;
use super::Harness;
use crate::domain::{single_record, CommandResult, ExecutionContext, RunOptions};
use crate::error::{AppError, Result};
use crate::port::EngineConfig;

impl Harness {
    /// Run a shell command on the target
    pub async fn run_shell(
        &self,
        ctx: &ExecutionContext,
        command: &str,
        opts: &RunOptions,
    ) -> Result<CommandResult> {
        let inventory = self.resolve_inventory(ctx).await?;
        debug!(host = %ctx.target, command = %command, "Running shell command");

        let records = self
            .engine
            .run_command(command, ctx.target.name(), inventory.as_ref())
            .await?;
        let record = single_record(records)?;
        let result = CommandResult::from_command(&record);

        if result.exit_code != 0 && !opts.expect_failures {
            return Err(execution_failed("shell", command, &record));
        }
        Ok(result)
    }

    /// Upload a local file to `destination` on the target
    pub async fn upload_file(
        &self,
        ctx: &ExecutionContext,
        source: &Path,
        destination: &str,
        opts: &RunOptions,
    ) -> Result<CommandResult> {
        let inventory = self.resolve_inventory(ctx).await?;
        debug!(
            host = %ctx.target,
            source = %source.display(),
            destination = %destination,
            "Uploading file"
        );

        let records = self
            .engine
            .upload_file(source, destination, ctx.target.name(), inventory.as_ref())
            .await?;
        let record = single_record(records)?;

        if !record.is_success() {
            if !opts.expect_failures {
                return Err(AppError::UploadFailed {
                    source_path: source.display().to_string(),
                    destination: destination.to_string(),
                    output: record.render(),
                });
            }
            warn!(host = %ctx.target, destination = %destination, "Upload failed (expected)");
        }
        Ok(CommandResult::from_upload(&record))
    }

    /// Run a task with JSON parameters, using the fixture module path
    pub async fn run_task(
        &self,
        ctx: &ExecutionContext,
        task_name: &str,
        params: &Value,
        opts: &RunOptions,
    ) -> Result<CommandResult> {
        let inventory = self.resolve_inventory(ctx).await?;
        let config = EngineConfig {
            modulepath: Some(ctx.modulepath.clone()),
        };
        debug!(host = %ctx.target, task = %task_name, params = %params, "Running task");

        let records = self
            .engine
            .run_task(task_name, ctx.target.name(), params, &config, inventory.as_ref())
            .await?;
        let record = single_record(records)?;

        if !record.is_success() && !opts.expect_failures {
            return Err(execution_failed("task", task_name, &record));
        }
        Ok(CommandResult::from_task(&record))
    }

    /// Run a local script on the target with the given arguments
    pub async fn run_script(
        &self,
        ctx: &ExecutionContext,
        script_path: &Path,
        opts: &RunOptions,
        arguments: &[String],
    ) -> Result<CommandResult> {
        let inventory = self.resolve_inventory(ctx).await?;
        let invocation = script_invocation(script_path, arguments);
        debug!(host = %ctx.target, script = %invocation, "Running script");

        let records = self
            .engine
            .run_script(script_path, ctx.target.name(), arguments, inventory.as_ref())
            .await?;
        let record = single_record(records)?;
        let result = CommandResult::from_command(&record);

        if result.exit_code != 0 && !opts.expect_failures {
            return Err(execution_failed("script", &invocation, &record));
        }
        Ok(result)
    }
}

fn script_invocation(script_path: &Path, arguments: &[String]) -> String {
    std::iter::once(script_path.display().to_string())
        .chain(arguments.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}
