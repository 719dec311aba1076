// Engine Record - one per-target item as reported by the orchestration engine

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Exit code used when the engine reports a failure without one
pub const SYNTHETIC_FAILURE_EXIT_CODE: i32 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Failure,
    #[serde(other)]
    Other,
}

/// Raw per-target record
///
/// `value` holds the engine payload: `exit_code`, `stdout`, `stderr` for
/// commands, `_output` for uploads and tasks, `_error` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub target: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    pub status: RecordStatus,
    #[serde(default, alias = "result")]
    pub value: Value,
}

/// Normalized view of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        exit_code: i32,
        stdout: Option<String>,
        stderr: Option<String>,
        output: Option<String>,
    },
    Failure {
        exit_code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
        message: String,
        details: Value,
    },
}

impl TargetRecord {
    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }

    pub fn outcome(&self) -> Outcome {
        let exit_code = int_field(&self.value, "exit_code");
        let stdout = str_field(&self.value, "stdout");
        let stderr = str_field(&self.value, "stderr");

        if self.is_success() {
            return Outcome::Success {
                exit_code: exit_code.unwrap_or(0),
                stdout,
                stderr,
                output: str_field(&self.value, "_output"),
            };
        }

        let error = self.value.get("_error");
        let details = error
            .and_then(|e| e.get("details"))
            .cloned()
            .unwrap_or(Value::Null);
        let message = error
            .and_then(|e| e.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} reported status {:?}", self.target, self.status));

        Outcome::Failure {
            exit_code: exit_code.or_else(|| details_exit_code(&details)),
            stdout,
            stderr,
            message,
            details,
        }
    }

    /// Compact rendering used in error messages
    pub fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Always populated: failures without a code map to 255
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success { exit_code, .. } => *exit_code,
            Outcome::Failure { exit_code, .. } => exit_code.unwrap_or(SYNTHETIC_FAILURE_EXIT_CODE),
        }
    }
}

/// Enforce the single-target precondition on an engine response
pub fn single_record(records: Vec<TargetRecord>) -> Result<TargetRecord> {
    let count = records.len();
    let mut iter = records.into_iter();
    match (iter.next(), count) {
        (None, _) => Err(AppError::EmptyResponse),
        (Some(record), 1) => Ok(record),
        (Some(_), n) => Err(AppError::MultipleTargets(n)),
    }
}

/// Exit code carried in `_error.details`: `exitcode`, then `exit_code`
pub(super) fn details_exit_code(details: &Value) -> Option<i32> {
    int_field(details, "exitcode").or_else(|| int_field(details, "exit_code"))
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int_field(value: &Value, key: &str) -> Option<i32> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
}
