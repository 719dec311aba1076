// Bolt CLI engine
// reason: tokio for async process management, serde_json for the JSON report
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

use litmus_core::domain::{Inventory, TargetRecord};
use litmus_core::port::engine::{EngineConfig, EngineError, OrchestrationEngine};
use litmus_core::port::TimeProvider;

/// Default executable name, resolved through PATH
pub const DEFAULT_BOLT_BINARY: &str = "bolt";

/// `--format json` report printed by every bolt run
#[derive(Debug, Deserialize)]
struct BoltReport {
    items: Vec<TargetRecord>,
}

/// Orchestration engine backed by the `bolt` command line
///
/// Bolt exits non-zero whenever a target fails but still prints its report,
/// so the report on stdout is authoritative and the exit status is only logged.
pub struct BoltCliEngine {
    binary: PathBuf,
    time_provider: Arc<dyn TimeProvider>,
}

impl BoltCliEngine {
    /// Create a new Bolt CLI engine
    ///
    /// # Arguments
    /// * `binary` - Path or name of the bolt executable
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let engine = BoltCliEngine::new("bolt", Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(binary: impl Into<PathBuf>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            binary: binary.into(),
            time_provider,
        }
    }

    /// Options common to every subcommand
    fn target_args(target: &str, inventory: Option<&Inventory>) -> Vec<String> {
        let mut args = vec![
            "--targets".to_string(),
            target.to_string(),
            "--format".to_string(),
            "json".to_string(),
        ];
        if let Some(inventory) = inventory {
            args.push("--inventoryfile".to_string());
            args.push(inventory.path.display().to_string());
        }
        args
    }

    fn command_args(command: &str, target: &str, inventory: Option<&Inventory>) -> Vec<String> {
        let mut args = vec!["command".to_string(), "run".to_string(), command.to_string()];
        args.extend(Self::target_args(target, inventory));
        args
    }

    fn upload_args(
        source: &Path,
        destination: &str,
        target: &str,
        inventory: Option<&Inventory>,
    ) -> Vec<String> {
        let mut args = vec![
            "file".to_string(),
            "upload".to_string(),
            source.display().to_string(),
            destination.to_string(),
        ];
        args.extend(Self::target_args(target, inventory));
        args
    }

    fn task_args(
        task_name: &str,
        target: &str,
        params: &Value,
        config: &EngineConfig,
        inventory: Option<&Inventory>,
    ) -> Vec<String> {
        let mut args = vec!["task".to_string(), "run".to_string(), task_name.to_string()];
        args.extend(Self::target_args(target, inventory));
        if let Some(modulepath) = &config.modulepath {
            args.push("--modulepath".to_string());
            args.push(modulepath.display().to_string());
        }
        let params = if params.is_null() {
            "{}".to_string()
        } else {
            params.to_string()
        };
        args.push("--params".to_string());
        args.push(params);
        args
    }

    /// Script arguments go last so bolt hands them to the script untouched
    fn script_args(
        script: &Path,
        target: &str,
        arguments: &[String],
        inventory: Option<&Inventory>,
    ) -> Vec<String> {
        let mut args = vec!["script".to_string(), "run".to_string()];
        args.extend(Self::target_args(target, inventory));
        args.push(script.display().to_string());
        args.extend(arguments.iter().cloned());
        args
    }

    /// Parse the JSON report, falling back to stderr for the error message
    fn parse_report(stdout: &[u8], stderr: &[u8]) -> Result<Vec<TargetRecord>, EngineError> {
        serde_json::from_slice::<BoltReport>(stdout)
            .map(|report| report.items)
            .map_err(|e| {
                let stderr = String::from_utf8_lossy(stderr);
                let detail = stderr.trim();
                if detail.is_empty() {
                    EngineError::InvalidResponse(e.to_string())
                } else {
                    EngineError::InvalidResponse(format!("{} ({})", detail, e))
                }
            })
    }

    /// Spawn bolt and wait for its report
    async fn invoke(&self, action: &str, args: Vec<String>) -> Result<Vec<TargetRecord>, EngineError> {
        let start_time = self.time_provider.now_millis();

        info!(
            binary = %self.binary.display(),
            action = %action,
            args = ?args,
            "Starting bolt"
        );

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                EngineError::SpawnFailed(format!("{}: {}", self.binary.display(), e))
            })?;

        let duration_ms = self.time_provider.now_millis() - start_time;

        if !output.status.success() {
            warn!(
                action = %action,
                exit_code = ?output.status.code(),
                duration_ms = %duration_ms,
                "Bolt reported failing targets"
            );
        }

        let records = Self::parse_report(&output.stdout, &output.stderr)?;

        info!(
            action = %action,
            duration_ms = %duration_ms,
            records = records.len(),
            "Bolt completed"
        );

        Ok(records)
    }
}

#[async_trait]
impl OrchestrationEngine for BoltCliEngine {
    async fn run_command(
        &self,
        command: &str,
        target: &str,
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError> {
        self.invoke("command", Self::command_args(command, target, inventory))
            .await
    }

    async fn upload_file(
        &self,
        source: &Path,
        destination: &str,
        target: &str,
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError> {
        self.invoke(
            "upload",
            Self::upload_args(source, destination, target, inventory),
        )
        .await
    }

    async fn run_task(
        &self,
        task_name: &str,
        target: &str,
        params: &Value,
        config: &EngineConfig,
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError> {
        self.invoke(
            "task",
            Self::task_args(task_name, target, params, config, inventory),
        )
        .await
    }

    async fn run_script(
        &self,
        script: &Path,
        target: &str,
        arguments: &[String],
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError> {
        self.invoke(
            "script",
            Self::script_args(script, target, arguments, inventory),
        )
        .await
    }
}
