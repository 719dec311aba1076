// Orchestration Engine Port
// Abstraction over the external engine that reaches targets (Bolt)

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{Inventory, TargetRecord};

/// Engine-level configuration passed with task runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub modulepath: Option<PathBuf>,
}

/// Engine errors (the engine could not be asked, or answered nonsense)
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

/// Orchestration Engine trait
///
/// Every call returns one record per target. Callers in this crate only ever
/// address a single target and reject anything else.
///
/// Implementations:
/// - BoltCliEngine: shells out to the `bolt` executable
/// - mocks::MockEngine: scripted responses for tests
#[async_trait]
pub trait OrchestrationEngine: Send + Sync {
    /// Run a shell command on the target
    async fn run_command(
        &self,
        command: &str,
        target: &str,
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError>;

    /// Copy a local file to `destination` on the target
    async fn upload_file(
        &self,
        source: &Path,
        destination: &str,
        target: &str,
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError>;

    /// Run a task by name with JSON parameters
    async fn run_task(
        &self,
        task_name: &str,
        target: &str,
        params: &Value,
        config: &EngineConfig,
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError>;

    /// Copy a local script to the target and run it with arguments
    async fn run_script(
        &self,
        script: &Path,
        target: &str,
        arguments: &[String],
        inventory: Option<&Inventory>,
    ) -> Result<Vec<TargetRecord>, EngineError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::RecordStatus;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// A call received by the mock engine
    #[derive(Debug, Clone, PartialEq)]
    pub enum EngineCall {
        Command {
            command: String,
            target: String,
            with_inventory: bool,
        },
        Upload {
            source: PathBuf,
            destination: String,
            target: String,
        },
        Task {
            name: String,
            target: String,
            params: Value,
            modulepath: Option<PathBuf>,
        },
        Script {
            path: PathBuf,
            target: String,
            arguments: Vec<String>,
        },
    }

    /// Successful command record
    pub fn command_record(target: &str, exit_code: i32, stdout: &str, stderr: &str) -> TargetRecord {
        let status = if exit_code == 0 {
            RecordStatus::Success
        } else {
            RecordStatus::Failure
        };
        let mut value = json!({"stdout": stdout, "stderr": stderr, "exit_code": exit_code});
        if exit_code != 0 {
            value["_error"] = json!({
                "kind": "puppetlabs.tasks/command-error",
                "msg": format!("The command failed with exit code {}", exit_code),
                "details": {"exit_code": exit_code}
            });
        }
        TargetRecord {
            target: target.to_string(),
            action: Some("command".to_string()),
            object: None,
            status,
            value,
        }
    }

    /// Record with an arbitrary status and payload
    pub fn record(target: &str, status: RecordStatus, value: Value) -> TargetRecord {
        TargetRecord {
            target: target.to_string(),
            action: None,
            object: None,
            status,
            value,
        }
    }

    /// Failure record carrying only an error message
    pub fn error_record(target: &str, msg: &str) -> TargetRecord {
        record(target, RecordStatus::Failure, json!({"_error": {"msg": msg}}))
    }

    /// Mock engine: pops scripted responses in order, records every call
    ///
    /// With no scripted response left, every call succeeds with exit code 0.
    #[derive(Clone, Default)]
    pub struct MockEngine {
        responses: Arc<Mutex<VecDeque<Result<Vec<TargetRecord>, String>>>>,
        calls: Arc<Mutex<Vec<EngineCall>>>,
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_records(&self, records: Vec<TargetRecord>) -> &Self {
            self.responses.lock().unwrap().push_back(Ok(records));
            self
        }

        pub fn push_record(&self, record: TargetRecord) -> &Self {
            self.push_records(vec![record])
        }

        /// Next call fails at the engine level
        pub fn push_engine_error(&self, message: impl Into<String>) -> &Self {
            self.responses.lock().unwrap().push_back(Err(message.into()));
            self
        }

        pub fn calls(&self) -> Vec<EngineCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Commands received, in order
        pub fn commands(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    EngineCall::Command { command, .. } => Some(command),
                    _ => None,
                })
                .collect()
        }

        fn respond(&self, call: EngineCall, target: &str) -> Result<Vec<TargetRecord>, EngineError> {
            self.calls.lock().unwrap().push(call);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(records)) => Ok(records),
                Some(Err(msg)) => Err(EngineError::SpawnFailed(msg)),
                None => Ok(vec![command_record(target, 0, "", "")]),
            }
        }
    }

    #[async_trait]
    impl OrchestrationEngine for MockEngine {
        async fn run_command(
            &self,
            command: &str,
            target: &str,
            inventory: Option<&Inventory>,
        ) -> Result<Vec<TargetRecord>, EngineError> {
            self.respond(
                EngineCall::Command {
                    command: command.to_string(),
                    target: target.to_string(),
                    with_inventory: inventory.is_some(),
                },
                target,
            )
        }

        async fn upload_file(
            &self,
            source: &Path,
            destination: &str,
            target: &str,
            _inventory: Option<&Inventory>,
        ) -> Result<Vec<TargetRecord>, EngineError> {
            self.respond(
                EngineCall::Upload {
                    source: source.to_path_buf(),
                    destination: destination.to_string(),
                    target: target.to_string(),
                },
                target,
            )
        }

        async fn run_task(
            &self,
            task_name: &str,
            target: &str,
            params: &Value,
            config: &EngineConfig,
            _inventory: Option<&Inventory>,
        ) -> Result<Vec<TargetRecord>, EngineError> {
            self.respond(
                EngineCall::Task {
                    name: task_name.to_string(),
                    target: target.to_string(),
                    params: params.clone(),
                    modulepath: config.modulepath.clone(),
                },
                target,
            )
        }

        async fn run_script(
            &self,
            script: &Path,
            target: &str,
            arguments: &[String],
            _inventory: Option<&Inventory>,
        ) -> Result<Vec<TargetRecord>, EngineError> {
            self.respond(
                EngineCall::Script {
                    path: script.to_path_buf(),
                    target: target.to_string(),
                    arguments: arguments.to_vec(),
                },
                target,
            )
        }
    }
}
