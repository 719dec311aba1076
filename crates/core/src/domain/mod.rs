// Domain Layer - Targets, engine records, uniform results

pub mod context;
pub mod error;
pub mod inventory;
pub mod options;
pub mod record;
pub mod result;
pub mod target;

// Re-exports
pub use context::ExecutionContext;
pub use error::DomainError;
pub use inventory::Inventory;
pub use options::{ApplyExpectation, ApplyOptions, RunOptions};
pub use record::{single_record, Outcome, RecordStatus, TargetRecord, SYNTHETIC_FAILURE_EXIT_CODE};
pub use result::CommandResult;
pub use target::Target;
