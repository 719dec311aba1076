// Failure reporting and debug diagnostics

use std::io::Write;

use crate::domain::{CommandResult, TargetRecord};
use crate::error::AppError;

pub(super) fn execution_failed(operation: &str, invocation: &str, record: &TargetRecord) -> AppError {
    AppError::ExecutionFailed {
        operation: operation.to_string(),
        invocation: invocation.to_string(),
        output: record.render(),
    }
}

/// Write the apply diagnostics block shown when debugging is enabled
pub fn write_apply_diagnostics<W: Write>(
    writer: &mut W,
    command: &str,
    result: &CommandResult,
) -> std::io::Result<()> {
    writeln!(writer, "apply manifest succeeded")?;
    writeln!(writer, " {}", command)?;
    writeln!(writer, " with:")?;
    writeln!(writer, "   exit_code: {}", result.exit_code)?;
    writeln!(writer, "   stdout: {}", result.stdout.as_deref().unwrap_or(""))?;
    writeln!(writer, "   stderr: {}", result.stderr.as_deref().unwrap_or(""))?;
    Ok(())
}

/// Diagnostics go to stderr; a broken stream never affects the result
pub(super) fn print_apply_diagnostics(command: &str, result: &CommandResult) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    if let Err(e) = write_apply_diagnostics(&mut handle, command, result) {
        tracing::debug!(error = %e, "Could not write apply diagnostics");
    }
}
