// Uniform Result - what every harness operation hands back

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{details_exit_code, Outcome, TargetRecord, SYNTHETIC_FAILURE_EXIT_CODE};

/// Uniform result of a harness operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    /// Raw engine payload (uploads and tasks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<Value>,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Shell commands, scripts and manifest applies
    pub fn from_command(record: &TargetRecord) -> Self {
        let outcome = record.outcome();
        let exit_code = outcome.exit_code();
        match outcome {
            Outcome::Success { stdout, stderr, .. } => Self {
                exit_code,
                stdout,
                stderr,
                raw_result: None,
            },
            Outcome::Failure {
                stdout,
                stderr,
                message,
                ..
            } => Self {
                exit_code,
                stdout,
                stderr: stderr.or(Some(message)),
                raw_result: None,
            },
        }
    }

    /// File uploads: any failure is 255
    pub fn from_upload(record: &TargetRecord) -> Self {
        match record.outcome() {
            Outcome::Success { output, .. } => Self {
                exit_code: 0,
                stdout: output,
                stderr: None,
                raw_result: Some(record.value.clone()),
            },
            Outcome::Failure { message, .. } => Self {
                exit_code: SYNTHETIC_FAILURE_EXIT_CODE,
                stdout: None,
                stderr: Some(message),
                raw_result: Some(record.value.clone()),
            },
        }
    }

    /// Tasks: unstructured output, or the whole payload when there is none
    ///
    /// A failed task takes its exit code from the error details only.
    pub fn from_task(record: &TargetRecord) -> Self {
        match record.outcome() {
            Outcome::Success { output, .. } => Self {
                exit_code: 0,
                stdout: Some(output.unwrap_or_else(|| record.value.to_string())),
                stderr: None,
                raw_result: Some(record.value.clone()),
            },
            Outcome::Failure {
                message, details, ..
            } => Self {
                exit_code: details_exit_code(&details).unwrap_or(SYNTHETIC_FAILURE_EXIT_CODE),
                stdout: None,
                stderr: Some(message),
                raw_result: Some(record.value.clone()),
            },
        }
    }
}
